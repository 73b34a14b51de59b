//! Repository error types.
//!
//! Uses miette for diagnostic output and thiserror for the derive macros.
//! These errors cover runtime access to the in-memory stores; decoding and
//! file errors live with the codec and the transfer layer.

use miette::Diagnostic;
use thiserror::Error;

use super::store::StoreState;

/// Repository operation errors.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum DbError {
    #[error("Entity not found: {entity_type} with id '{id}'")]
    #[diagnostic(code(cams::db::not_found))]
    NotFound { entity_type: String, id: String },

    #[error("Entity already exists: {entity_type} with id '{id}'")]
    #[diagnostic(code(cams::db::already_exists))]
    AlreadyExists { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(cams::db::validation_error))]
    Validation { message: String },

    #[error("Constraint violation: {message}")]
    #[diagnostic(code(cams::db::constraint))]
    Constraint { message: String },

    #[error("{entity_type} store is {state} and cannot be modified")]
    #[diagnostic(
        code(cams::db::not_ready),
        help("Stores accept runtime changes only after import has finished")
    )]
    NotReady {
        entity_type: String,
        state: StoreState,
    },

    #[error("{count} unresolved integrity violation(s) block modification")]
    #[diagnostic(
        code(cams::db::integrity_unresolved),
        help("Review the violations reported by import and acknowledge them first")
    )]
    IntegrityUnresolved { count: usize },
}

impl DbError {
    pub(crate) fn not_found(entity_type: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DbError::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn constraint(message: impl Into<String>) -> Self {
        DbError::Constraint {
            message: message.into(),
        }
    }
}

/// Result type for repository operations.
pub type DbResult<T> = Result<T, DbError>;
