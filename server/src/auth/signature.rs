//! HMAC-SHA256 Request Signature Verification
//!
//! Slack signs every webhook with the `v0` scheme:
//! `v0=` + hex(HMAC-SHA256(secret, "v0:{timestamp}:{raw body}")).
//! Requests outside the freshness window are rejected to bound replays.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Signing scheme version prefix.
pub const SIGNATURE_VERSION: &str = "v0";

/// Maximum accepted clock skew in seconds (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verifies inbound webhook signatures against the shared signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl SignatureVerifier {
    /// Create a verifier with the default 5 minute window.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Override the freshness window.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        mac
    }

    /// Compute the signature header value for a timestamp and raw body.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        let digest = self.mac(timestamp, body).finalize().into_bytes();
        format!("{SIGNATURE_VERSION}={}", hex::encode(digest))
    }

    /// Verify a request against the current wall clock.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        self.verify_at(timestamp, signature, body, chrono::Utc::now().timestamp())
    }

    /// Verify a request as of `now` (Unix seconds).
    ///
    /// A skew of exactly the tolerance is still accepted.
    pub fn verify_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
        let signature = signature.ok_or(SignatureError::MissingSignature)?;
        if body.is_empty() {
            return Err(SignatureError::MissingBody);
        }

        let sent_at: i64 = timestamp
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;
        let skew = now.abs_diff(sent_at);
        if skew > self.tolerance_secs.unsigned_abs() {
            return Err(SignatureError::Stale { skew_secs: skew });
        }

        let digest = decode_signature(signature).ok_or(SignatureError::Mismatch)?;

        // The timestamp is signed exactly as received, never re-serialized.
        self.mac(timestamp, body)
            .verify_slice(&digest)
            .map_err(|_| SignatureError::Mismatch)
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

/// Raw digest from a `v0=<lowercase hex>` header value.
fn decode_signature(signature: &str) -> Option<Vec<u8>> {
    let hex_digest = signature
        .strip_prefix(SIGNATURE_VERSION)?
        .strip_prefix('=')?;
    if !hex_digest
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    hex::decode(hex_digest).ok()
}
