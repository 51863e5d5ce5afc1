//! Error types for folio-qa

use thiserror::Error;

/// Result type alias using folio-qa Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the QA endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connect, send or body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint answered with a non-success status
    #[error("QA endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a status error, keeping only the first line of a long body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = body.lines().next().unwrap_or("").trim().to_string();
        Self::Status { status, body }
    }
}
