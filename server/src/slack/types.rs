//! Slack Payload Types
//!
//! Inbound webhook bodies and outbound Web API messages.

use serde::{Deserialize, Serialize};

/// Slash command invocation, sent form-encoded to `/commands`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommandPayload {
    pub token: String,
    pub team_id: String,
    pub team_domain: String,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub user_name: String,
    pub command: String,
    pub text: String,
    pub response_url: String,
    pub trigger_id: String,
}

/// Channel name Slack reports for direct messages.
pub const DIRECT_MESSAGE_CHANNEL: &str = "directmessage";

/// Events API request body, discriminated by its outer `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRequest {
    /// Endpoint ownership handshake; answered inline with the challenge.
    UrlVerification { challenge: String },
    /// A subscribed event occurred.
    EventCallback(EventCallback),
    /// Anything else (`app_rate_limited`, future types).
    #[serde(other)]
    Other,
}

/// Envelope around a single subscribed event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventCallback {
    pub team_id: String,
    pub api_app_id: String,
    pub event_id: String,
    pub event_time: i64,
    pub event: SlackEvent,
}

/// The event itself. Only the fields handlers read are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub user: String,
    pub channel: String,
    pub team: String,
    pub ts: String,
}

/// Event type for mentions of the bot.
pub const APP_MENTION: &str = "app_mention";

/// Visibility of a `response_url` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only the invoking user sees it.
    Ephemeral,
}

/// Body posted to a slash command's `response_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
}

impl ResponseMessage {
    /// Plain reply with Slack's default visibility.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_type: None,
        }
    }

    /// Reply only the invoking user can see.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_type: Some(ResponseType::Ephemeral),
        }
    }
}

/// `chat.postMessage` request body.
#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
}

/// Identity of the token owner, from `auth.test`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthIdentity {
    pub user_id: String,
    #[serde(default)]
    pub team_id: String,
}
