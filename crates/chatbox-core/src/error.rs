use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::BackendClient`]
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Backend answered 200 but with an `{"error": ...}` body
    #[error("backend error: {0}")]
    Backend(String),

    /// Body did not have the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
