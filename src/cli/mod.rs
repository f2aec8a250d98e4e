//! CLI support for qql-lang
//!
//! Provides programmatic access to the qql subcommands so other tools can
//! embed them.

mod check;
mod docs;
mod filter;
mod functions;

pub use check::{CheckOptions, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use filter::{FilterOptions, OutputFormat, execute_filter};
pub use functions::list_functions;

use std::io;

use crate::compiler::RangeError;
use crate::config::ConfigError;
use crate::parser::ParseError;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Query did not compile
    Parse(ParseError),
    /// Range did not compile
    Range(RangeError),
    /// Config file unreadable or invalid
    Config(ConfigError),
    /// JSON output failed
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No task list provided
    NoInput,
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Invalid query: {}", e),
            CliError::Range(e) => write!(f, "Invalid range: {}", e),
            CliError::Config(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No task list provided. Pass a file or pipe tasks to stdin.")
            }
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'qql docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Range(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<RangeError> for CliError {
    fn from(e: RangeError) -> Self {
        CliError::Range(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
