//! Webhook Authentication
//!
//! Every inbound webhook must carry a fresh, valid HMAC signature before it
//! may enqueue work.

pub mod error;
pub mod middleware;
pub mod signature;

pub use error::SignatureError;
pub use middleware::{require_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER};
pub use signature::SignatureVerifier;
