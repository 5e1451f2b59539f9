//! Error types for fixver-clients

use thiserror::Error;

/// Errors raised while constructing a client or its requests.
///
/// Request failures reach callers through the port error types
/// (`TrackerError`, `AdvisoryError`).
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL does not parse or cannot be a base
    #[error("invalid base URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The HTTP client could not be built (TLS backend, proxy settings)
    #[error("HTTP client setup failed: {0}")]
    Http(String),

    /// No SPNEGO token could be produced
    #[error("Negotiate token unavailable: {0}")]
    Negotiate(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.to_string())
    }
}

/// Result type for client construction
pub type Result<T> = std::result::Result<T, ClientError>;
