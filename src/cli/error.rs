use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;
use crate::sync::TransferError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error("Data contains {count} referential integrity violation(s)")]
    #[diagnostic(
        code(cams::cli::integrity_unresolved),
        help("Run `cams check` to review them, then pass --acknowledge to prune and continue")
    )]
    IntegrityUnresolved { count: usize },

    #[error("{unreadable} unreadable file(s) and {malformed} malformed row(s) would be lost on save")]
    #[diagnostic(
        code(cams::cli::unsafe_save),
        help("Run `cams check` to review them and fix the data files first")
    )]
    UnsafeSave { unreadable: usize, malformed: usize },

    #[error("Unknown output format '{format}'")]
    #[diagnostic(code(cams::cli::invalid_format), help("Use 'table' or 'json'"))]
    InvalidFormat { format: String },

    #[error("Unknown roster filter '{filter}'")]
    #[diagnostic(
        code(cams::cli::invalid_filter),
        help("Use 'all', 'attendees' or 'committee'")
    )]
    InvalidFilter { filter: String },

    #[error("Failed to render output: {message}")]
    #[diagnostic(code(cams::cli::render))]
    Render { message: String },
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Render {
            message: e.to_string(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
