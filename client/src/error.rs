//! Unified error handling for the client.

use crate::config::ConfigError;
use kinbase_engine::ErrorResponse;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Engine error: {0}")]
    Engine(#[from] kinbase_engine::Error),

    #[error("{}", transport_message(*status, error.as_ref()))]
    Transport {
        status: u16,
        /// Parsed error body, when the service sent one
        error: Option<ErrorResponse>,
        body: String,
    },

    #[error("Upload of '{file_name}' failed: {reason}")]
    Upload { file_name: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Insert response carried no record id")]
    EmptyInsertResponse,
}

impl Error {
    /// Build a transport error from a non-2xx response body.
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Error::Transport {
            status,
            error: kinbase_engine::codec::decode_error_response(&body),
            body,
        }
    }

    /// HTTP status of a transport error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn transport_message(status: u16, error: Option<&ErrorResponse>) -> String {
    match error {
        Some(e) => format!("Transport error (HTTP {}): {}", status, e),
        None => format!("Transport error (HTTP {})", status),
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
