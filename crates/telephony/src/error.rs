//! Error types for the telephony client.

use thiserror::Error;

/// Errors that can occur when triggering an outbound call.
#[derive(Debug, Error)]
pub enum TelephonyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bridge answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The bridge accepted the request but reported that the call failed.
    #[error("call rejected: {0}")]
    Rejected(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
