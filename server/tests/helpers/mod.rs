//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for sending requests through the full axum router with
//! real queues and dispatchers, backed by a `RecordingChat` that captures every
//! outbound Slack call instead of touching the network.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use codebro_server::api::{create_router, AppState};
use codebro_server::auth::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use codebro_server::commands::{self, CommandJob};
use codebro_server::config::Config;
use codebro_server::events::{self, BotIdentityCache, EventContext, EventJob};
use codebro_server::queue::EventQueue;
use codebro_server::slack::{AuthIdentity, ChatApi, ChatApiError, ResponseMessage};

pub const FORM: &str = "application/x-www-form-urlencoded";
pub const JSON: &str = "application/json";

/// Bot user id reported by the fake `auth.test`.
pub const BOT_USER_ID: &str = "UBOT";

// ============================================================================
// Recording chat client
// ============================================================================

/// One outbound call made by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    PostMessage { channel: String, text: String },
    Respond { url: String, message: ResponseMessage },
    AuthTest,
}

/// `ChatApi` that records calls and can be told to fail for given channels.
#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<Sent>>,
    failing_channels: Mutex<HashSet<String>>,
}

impl RecordingChat {
    /// Every call so far, in order.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Make `post_message` to `channel` fail with `channel_not_found`.
    pub fn fail_channel(&self, channel: &str) {
        self.failing_channels
            .lock()
            .unwrap()
            .insert(channel.to_string());
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

impl ChatApi for RecordingChat {
    fn post_message<'a>(
        &'a self,
        channel: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatApiError>> {
        Box::pin(async move {
            self.record(Sent::PostMessage {
                channel: channel.to_string(),
                text: text.to_string(),
            });
            if self.failing_channels.lock().unwrap().contains(channel) {
                return Err(ChatApiError::Api {
                    method: "chat.postMessage".into(),
                    error: "channel_not_found".into(),
                });
            }
            Ok(())
        })
    }

    fn respond<'a>(
        &'a self,
        response_url: &'a str,
        message: &'a ResponseMessage,
    ) -> BoxFuture<'a, Result<(), ChatApiError>> {
        Box::pin(async move {
            self.record(Sent::Respond {
                url: response_url.to_string(),
                message: message.clone(),
            });
            Ok(())
        })
    }

    fn auth_test(&self) -> BoxFuture<'_, Result<AuthIdentity, ChatApiError>> {
        Box::pin(async move {
            self.record(Sent::AuthTest);
            Ok(AuthIdentity {
                user_id: BOT_USER_ID.to_string(),
                team_id: "T1".to_string(),
            })
        })
    }
}

// ============================================================================
// Test application
// ============================================================================

/// Full router plus running dispatchers.
pub struct TestApp {
    router: Router,
    pub config: Config,
    pub commands: EventQueue<CommandJob>,
    pub events: EventQueue<EventJob>,
    pub chat: Arc<RecordingChat>,
    workers: Vec<JoinHandle<()>>,
}

impl TestApp {
    /// Build the app with test configuration. Must run inside a tokio runtime.
    pub fn new() -> Self {
        let config = Config::default_for_test();
        let chat = Arc::new(RecordingChat::default());
        let api: Arc<dyn ChatApi> = chat.clone();

        let commands = EventQueue::new();
        let events = EventQueue::new();
        let identity = Arc::new(BotIdentityCache::new(
            Arc::clone(&api),
            Duration::from_secs(config.bot_identity_ttl_secs),
        ));

        let workers = vec![
            commands::dispatcher(commands.clone(), Arc::clone(&api)).spawn(),
            events::dispatcher(
                events.clone(),
                EventContext::new(api, identity, &config.source_code_url),
            )
            .spawn(),
        ];

        let state = AppState::new(config.clone(), commands.clone(), events.clone());

        Self {
            router: create_router(state),
            config,
            commands,
            events,
            chat,
            workers,
        }
    }

    /// Build a request for the router.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router.
    pub async fn oneshot(&self, req: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible")
    }

    /// POST `body` to `path`, signed as of now.
    pub fn signed(&self, path: &str, content_type: &str, body: &str) -> Request<Body> {
        self.signed_at(path, content_type, body, chrono::Utc::now().timestamp())
    }

    /// POST `body` to `path`, signed with the given timestamp.
    pub fn signed_at(
        &self,
        path: &str,
        content_type: &str,
        body: &str,
        timestamp: i64,
    ) -> Request<Body> {
        let timestamp = timestamp.to_string();
        let signature = self.sign(&timestamp, body);

        Self::request(Method::POST, path)
            .header("Content-Type", content_type)
            .header(TIMESTAMP_HEADER, timestamp)
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Signature header value for `timestamp` and `body`.
    pub fn sign(&self, timestamp: &str, body: &str) -> String {
        SignatureVerifier::new(self.config.slack_signing_secret.clone())
            .sign(timestamp, body.as_bytes())
    }

    /// Wait until both queues have processed everything enqueued so far.
    pub async fn drain(&self) {
        let drained = async {
            self.commands.idle().await;
            self.events.idle().await;
        };
        tokio::time::timeout(Duration::from_secs(5), drained)
            .await
            .expect("queues did not drain within 5s");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

// ============================================================================
// Payload builders
// ============================================================================

/// Form body for a slash command. `text` must already be form-encoded.
pub fn command_body(text: &str, channel_name: &str, hook: &str) -> String {
    format!(
        "token=t&team_id=T1&team_domain=test&channel_id=C1&channel_name={channel_name}\
         &user_id=U1&user_name=alice&command=%2Fcodebro&text={text}\
         &response_url=https%3A%2F%2Fhooks.slack.test%2F{hook}&trigger_id=1.2"
    )
}

/// Decoded `response_url` for a hook id used in [`command_body`].
pub fn hook_url(hook: &str) -> String {
    format!("https://hooks.slack.test/{hook}")
}

/// Events API callback JSON for an event of `kind`.
pub fn event_body(kind: &str, channel: &str, text: &str) -> String {
    serde_json::json!({
        "token": "t",
        "team_id": "T1",
        "api_app_id": "A1",
        "type": "event_callback",
        "event_id": "Ev1",
        "event_time": 1_700_000_000,
        "event": {
            "type": kind,
            "user": "U1",
            "text": text,
            "ts": "1700000000.000100",
            "channel": channel,
            "event_ts": "1700000000.000100"
        }
    })
    .to_string()
}

/// Collect a response body as a string.
pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
