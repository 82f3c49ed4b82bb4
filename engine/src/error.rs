//! Error types for the kinbase engine.

use thiserror::Error;

/// All possible errors from the kinbase engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Field/record contract errors
    #[error("type mismatch for field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("result set has no current record")]
    NoCurrentRecord,

    #[error("record has no id")]
    MissingRecordId,

    #[error("invalid date in field '{field}': {value}")]
    InvalidDate { field: String, value: String },

    // Codec errors
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("field '{0}' has a pending upload that was never resolved")]
    UnresolvedUpload(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
