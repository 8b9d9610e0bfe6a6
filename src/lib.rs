//! Grindgraph - callgrind/cachegrind profile parser
//!
//! This library reads the line-oriented profile dumps written by valgrind's
//! callgrind/cachegrind and by xdebug, and builds an in-memory call graph
//! annotated with per-event costs (time, memory, instruction counts, ...).
//! Consumers query the graph for a function's own cost, its direct call
//! sites, and aggregate costs including callees.

pub mod cli;
pub mod config;
pub mod context;
pub mod cost;
pub mod error;
pub mod events;
pub mod graph;
pub mod json_output;
pub mod parser;
pub mod registry;
pub mod text_output;

pub use config::ParserConfig;
pub use error::{GraphError, Result};
pub use events::EventRegistry;
pub use graph::{CallGraph, CallRef, FunctionId, FunctionRef};
pub use parser::{parse_file, parse_lines, parse_reader, Parser};
