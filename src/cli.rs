//! CLI argument parsing for grindgraph

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the parsed graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Call tree plus function table (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "grindgraph")]
#[command(version)]
#[command(about = "Inspect callgrind/cachegrind profiles as a call graph", long_about = None)]
pub struct Cli {
    /// Profile dump to read (cachegrind.out.*, callgrind.out.*)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Event to report (defaults to the first declared event)
    #[arg(short = 'e', long = "event", value_name = "NAME")]
    pub event: Option<String>,

    /// Maximum call depth printed in the call tree
    #[arg(short = 'd', long = "depth", value_name = "N", default_value = "8")]
    pub depth: usize,

    /// Number of rows in the function table
    #[arg(short = 'n', long = "top", value_name = "N", default_value = "20")]
    pub top: usize,

    /// Parser configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Name suffix marking the entry point (overrides the config file)
    #[arg(long = "main-marker", value_name = "MARKER")]
    pub main_marker: Option<String>,

    /// Retry callees that are declared after their call sites
    #[arg(long = "resolve-forward-calls")]
    pub resolve_forward_calls: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
