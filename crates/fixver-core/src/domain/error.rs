//! Error taxonomy for fixver.
//!
//! Port errors ([`TrackerError`], [`AdvisoryError`]) are produced by the HTTP
//! adapters. [`FixverError`] is what the run pipeline surfaces to the binary;
//! everything it carries is fatal for the run.

use thiserror::Error;

use super::bug::BugId;

/// Errors from the bug tracker port.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("can't decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("response from {url} is missing `{field}`")]
    MissingField { url: String, field: String },
}

impl TrackerError {
    /// The body arrived but was not the structure we expected.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            TrackerError::Decode { .. } | TrackerError::MissingField { .. }
        )
    }
}

/// Errors from the advisory service port.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("can't decode advisory at {url}: {message}")]
    Decode { url: String, message: String },

    /// No Negotiate token could be produced for the request.
    #[error("can't authenticate to {url}: {message}")]
    Auth { url: String, message: String },
}

/// Fatal run errors.
#[derive(Debug, Error)]
pub enum FixverError {
    #[error("bug search failed: {0}")]
    BugSearch(#[source] TrackerError),

    #[error("fetching comments of bug {bug} failed: {source}")]
    Comments {
        bug: BugId,
        #[source]
        source: TrackerError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for fixver domain operations.
pub type Result<T> = std::result::Result<T, FixverError>;
