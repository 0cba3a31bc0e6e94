//! Slack Web API Client
//!
//! Outbound side of the bot. Handlers only see the [`ChatApi`] trait so tests
//! can record calls instead of hitting the network.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::error::ChatApiError;
use super::types::{AuthIdentity, PostMessageRequest, ResponseMessage};

/// Outbound chat operations used by command and event handlers.
pub trait ChatApi: Send + Sync {
    /// Post `text` to a channel, DM or user id via `chat.postMessage`.
    fn post_message<'a>(
        &'a self,
        channel: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatApiError>>;

    /// Reply to a slash command through its `response_url`.
    fn respond<'a>(
        &'a self,
        response_url: &'a str,
        message: &'a ResponseMessage,
    ) -> BoxFuture<'a, Result<(), ChatApiError>>;

    /// Resolve the identity of the bot token via `auth.test`.
    fn auth_test(&self) -> BoxFuture<'_, Result<AuthIdentity, ChatApiError>>;
}

/// `reqwest`-backed [`ChatApi`].
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    /// Build a client for `base_url` (e.g. `https://slack.com/api`).
    pub fn new(base_url: &str, token: &str) -> Result<Self, ChatApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Call a Web API method and decode the payload of an `ok: true` reply.
    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, ChatApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        if !value.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let error = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error")
                .to_string();
            return Err(ChatApiError::Api { method: method.to_string(), error });
        }

        debug!(method, "Slack API call succeeded");
        serde_json::from_value(value).map_err(ChatApiError::Decode)
    }
}

impl ChatApi for SlackClient {
    fn post_message<'a>(
        &'a self,
        channel: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatApiError>> {
        Box::pin(async move {
            let _: Value = self
                .call("chat.postMessage", &PostMessageRequest { channel, text })
                .await?;
            Ok(())
        })
    }

    fn respond<'a>(
        &'a self,
        response_url: &'a str,
        message: &'a ResponseMessage,
    ) -> BoxFuture<'a, Result<(), ChatApiError>> {
        Box::pin(async move {
            let response = self.http.post(response_url).json(message).send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ChatApiError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(())
        })
    }

    fn auth_test(&self) -> BoxFuture<'_, Result<AuthIdentity, ChatApiError>> {
        Box::pin(async move { self.call("auth.test", &serde_json::json!({})).await })
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
