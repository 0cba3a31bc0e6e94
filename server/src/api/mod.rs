//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    auth::{self, SignatureVerifier},
    commands::{self, CommandJob},
    config::Config,
    events::{self, EventJob},
    queue::EventQueue,
};

/// Shared application state.
///
/// Request handlers only enqueue; the dispatchers consuming these queues own
/// the outbound clients.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Webhook signature verifier
    pub verifier: Arc<SignatureVerifier>,
    /// Slash command queue
    pub commands: EventQueue<CommandJob>,
    /// Events API queue
    pub events: EventQueue<EventJob>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        config: Config,
        commands: EventQueue<CommandJob>,
        events: EventQueue<EventJob>,
    ) -> Self {
        let verifier = SignatureVerifier::new(config.slack_signing_secret.clone())
            .with_tolerance(config.signature_tolerance_secs);

        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            commands,
            events,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    // Signed Slack webhooks. `route_layer` keeps the signature check off the 404 fallback.
    let webhook_routes = Router::new()
        .route("/commands", post(commands::handlers::receive))
        .route("/events", post(events::handlers::receive))
        .route_layer(from_fn_with_state(state.clone(), auth::require_signature));

    Router::new()
        // Health check
        .route("/ping", get(ping))
        .merge(webhook_routes)
        .fallback(not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_size))
        // State
        .with_state(state)
}

/// Liveness check.
async fn ping() -> &'static str {
    "pong"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
