//! Slack Web API Error Types

use thiserror::Error;

/// Errors from outbound chat calls.
#[derive(Debug, Error)]
pub enum ChatApiError {
    /// Transport failure (connect, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Slack answered `ok: false`.
    #[error("Slack API {method} failed: {error}")]
    Api { method: String, error: String },

    /// `ok: true` but the payload did not have the expected shape.
    #[error("Unexpected response payload: {0}")]
    Decode(#[source] serde_json::Error),
}
