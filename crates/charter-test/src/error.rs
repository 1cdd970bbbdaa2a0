//! Test error types.

use thiserror::Error;

/// Errors that can occur while building requests or reading responses.
#[derive(Debug, Error)]
pub enum TestError {
    /// Request building failed.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// Response body reading failed.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}
