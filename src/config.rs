//! Parser configuration
//!
//! Loaded from TOML or built in code; every field has a default so an empty
//! file is a valid configuration.
//!
//! ```toml
//! main_marker = "{main}"
//! strict_events = false
//! resolve_forward_calls = false
//! ```

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name suffix xdebug gives the top-level script body
pub const DEFAULT_MAIN_MARKER: &str = "{main}";

/// Configuration for a parse session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// A function whose resolved name ends with this marker is the entry point
    pub main_marker: String,

    /// Log cost lines whose value count differs from the event count at
    /// `warn` instead of `debug`
    pub strict_events: bool,

    /// Retry unresolved `cfn=` callees once the whole dump has been read
    ///
    /// Off by default: a callee must be declared before it is called. Dumps
    /// written by valgrind declare callees after their callers and need this.
    pub resolve_forward_calls: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            main_marker: DEFAULT_MAIN_MARKER.to_string(),
            strict_events: false,
            resolve_forward_calls: false,
        }
    }
}

impl ParserConfig {
    /// Load configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| GraphError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_main_marker(mut self, marker: impl Into<String>) -> Self {
        self.main_marker = marker.into();
        self
    }

    pub fn with_forward_calls(mut self, enabled: bool) -> Self {
        self.resolve_forward_calls = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.main_marker.is_empty() {
            return Err(GraphError::InvalidConfig(
                "main_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `name` designates the program entry point
    pub fn is_main(&self, name: &str) -> bool {
        !name.is_empty() && name.ends_with(&self.main_marker)
    }
}
