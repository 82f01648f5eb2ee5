//! Error types for shelf-client

use thiserror::Error;

/// Remote API errors
///
/// Service adapters treat every variant the same way: log and fall back.
/// The distinction only matters for logging and tests.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Parse(e.to_string())
    }
}

/// List-processing worker errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// Processing failed; the message is all the worker reports
    #[error("Processing error: {0}")]
    Processing(String),

    /// No response within the allowed time
    #[error("Worker request timed out")]
    Timeout,

    /// Worker thread is gone
    #[error("Worker disconnected")]
    Disconnected,
}
