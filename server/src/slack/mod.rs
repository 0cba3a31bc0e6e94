//! Slack Integration
//!
//! Payload types for inbound webhooks and the outbound Web API client.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatApi, SlackClient};
pub use error::ChatApiError;
pub use types::{
    AuthIdentity, CommandPayload, EventCallback, EventRequest, ResponseMessage, ResponseType,
    SlackEvent,
};
