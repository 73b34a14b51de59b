//! Codec error types.

use miette::Diagnostic;
use thiserror::Error;

/// A single text field that could not be turned into a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("'{0}' is not a non-negative integer")]
    InvalidInteger(String),

    #[error("'{0}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("'{0}' is not a boolean (expected true or false)")]
    InvalidBool(String),

    #[error("'{0}' is not a suggestion status")]
    InvalidStatus(String),

    #[error("'{0}' is not an e-mail address")]
    InvalidEmail(String),

    #[error("map entry '{0}' has no key/value separator")]
    MalformedMapEntry(String),
}

/// What went wrong with a row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("duplicate id '{0}'")]
    DuplicateId(String),
}

/// A malformed record, located by file, row and field.
///
/// Rows are numbered from 1 at the first line after the header.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("{file} row {row}, field {field}: {kind}")]
#[diagnostic(code(cams::codec::format))]
pub struct FormatError {
    pub file: String,
    pub row: usize,
    pub field: String,
    pub kind: FormatErrorKind,
}

/// A raw value that cannot be stored without escaping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("value {value:?} contains reserved delimiter {delimiter:?}")]
    Delimiter { value: String, delimiter: char },

    #[error("value equals the empty-collection sentinel")]
    Sentinel,

    #[error("value must not be empty")]
    Empty,
}

/// An entity that cannot be written as a record.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{entity} '{id}', field {field}: {source}")]
    #[diagnostic(
        code(cams::codec::reserved_value),
        help("Delimiter characters are not escaped and cannot appear inside stored values")
    )]
    ReservedValue {
        entity: String,
        id: String,
        field: String,
        #[source]
        source: ValueError,
    },

    #[error("{entity} '{id}' is a {actual}, not a {expected}")]
    #[diagnostic(code(cams::codec::role_mismatch))]
    RoleMismatch {
        entity: String,
        id: String,
        expected: String,
        actual: String,
    },
}
