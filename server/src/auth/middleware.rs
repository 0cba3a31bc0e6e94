//! Signature Middleware
//!
//! Buffers the raw request body, verifies the Slack signature over those
//! exact bytes, and hands the untouched body on to the route's extractors.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::api::AppState;

use super::error::SignatureError;

/// Header carrying the Unix timestamp the request was signed at.
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Header carrying the `v0=` signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

/// Middleware to require a valid webhook signature.
///
/// Must run before any body extractor: form or JSON parsing would change the
/// bytes the signature covers.
///
/// ```ignore
/// Router::new()
///     .route("/commands", post(handler))
///     .route_layer(axum::middleware::from_fn_with_state(state, require_signature))
/// ```
pub async fn require_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, SignatureError> {
    let (parts, body) = request.into_parts();

    match verified_body(&state, &parts.headers, body).await {
        Ok(bytes) => Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await),
        Err(e) => {
            warn!(
                path = %parts.uri.path(),
                reason = e.code(),
                "Rejected webhook: {}", e
            );
            Err(e)
        }
    }
}

/// Read the body of a request whose signature headers are present, then
/// verify it. Requests without them are rejected before the body is read.
async fn verified_body(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> Result<Bytes, SignatureError> {
    let timestamp = header_str(headers, TIMESTAMP_HEADER).ok_or(SignatureError::MissingTimestamp)?;
    let signature = header_str(headers, SIGNATURE_HEADER).ok_or(SignatureError::MissingSignature)?;

    let bytes = axum::body::to_bytes(body, state.config.max_body_size)
        .await
        .map_err(|_| SignatureError::BodyRead)?;

    state.verifier.verify(Some(timestamp), Some(signature), &bytes)?;
    Ok(bytes)
}
