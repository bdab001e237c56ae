//! CLI support for jsonquery-lang
//!
//! Provides programmatic access to the `jsonquery` commands for embedding
//! in other tools.

mod check;
mod convert;
mod docs;

pub use check::{
    CheckOptions, CheckResult, FormatOptions, execute_check, execute_format, execute_parse,
};
pub use convert::{load_query, parse_input, parse_operators, render};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Parsing, compiling or evaluating the query failed
    #[error("{0}")]
    Query(#[from] crate::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'jsonquery docs' to see available categories.")]
    UnknownCategory(String),
}

impl From<crate::ReferenceError> for CliError {
    fn from(e: crate::ReferenceError) -> Self {
        CliError::Query(e.into())
    }
}
