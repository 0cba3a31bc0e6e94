//! Webhook Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Reasons an inbound webhook is refused. All map to `401 Unauthorized`.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// `X-Slack-Request-Timestamp` header absent.
    #[error("Missing request timestamp")]
    MissingTimestamp,

    /// `X-Slack-Signature` header absent.
    #[error("Missing request signature")]
    MissingSignature,

    /// Empty request body.
    #[error("Missing request body")]
    MissingBody,

    /// Body could not be read (too large or connection error).
    #[error("Request body could not be read")]
    BodyRead,

    /// Timestamp is not an integer.
    #[error("Invalid request timestamp")]
    InvalidTimestamp,

    /// Timestamp outside the freshness window.
    #[error("Request timestamp outside the allowed window ({skew_secs}s skew)")]
    Stale { skew_secs: u64 },

    /// Signature does not match.
    #[error("Signature mismatch")]
    Mismatch,
}

impl SignatureError {
    /// Machine-readable code for logs and the response body.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingTimestamp => "MISSING_TIMESTAMP",
            Self::MissingSignature => "MISSING_SIGNATURE",
            Self::MissingBody => "MISSING_BODY",
            Self::BodyRead => "BODY_READ",
            Self::InvalidTimestamp => "INVALID_TIMESTAMP",
            Self::Stale { .. } => "STALE_REQUEST",
            Self::Mismatch => "SIGNATURE_MISMATCH",
        }
    }
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for SignatureError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message: "Unauthorized".to_string(),
        });

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
