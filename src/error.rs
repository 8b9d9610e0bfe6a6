//! Error taxonomy for profile parsing and graph queries
//!
//! Only structural failures surface here. Content-level anomalies in a dump
//! (bad numeric tokens, unknown `cfn=` identities, orphan cost lines) are
//! tolerated by the parser and never become errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a profile or querying the graph
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Profile source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while reading profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown event: {name}")]
    UnknownEvent { name: String },

    #[error("Invalid parser configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for parsing and query operations
pub type Result<T> = std::result::Result<T, GraphError>;
