//! `codebro` Server - Main Entry Point
//!
//! Slack bot backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use codebro_server::events::{BotIdentityCache, EventContext};
use codebro_server::queue::EventQueue;
use codebro_server::slack::{ChatApi, SlackClient};
use codebro_server::{api, commands, config, events};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codebro_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting codebro server"
    );

    // Outbound Slack client shared by both dispatchers
    let chat: Arc<dyn ChatApi> = Arc::new(SlackClient::new(
        &config.slack_api_base_url,
        &config.slack_oauth_token,
    )?);
    let identity = Arc::new(BotIdentityCache::new(
        Arc::clone(&chat),
        Duration::from_secs(config.bot_identity_ttl_secs),
    ));

    // One queue and one consumer per stream
    let command_queue = EventQueue::new();
    let event_queue = EventQueue::new();

    let workers = [
        commands::dispatcher(command_queue.clone(), Arc::clone(&chat)).spawn(),
        events::dispatcher(
            event_queue.clone(),
            EventContext::new(Arc::clone(&chat), identity, &config.source_code_url),
        )
        .spawn(),
    ];

    // Build application state and router
    let state = api::AppState::new(config.clone(), command_queue.clone(), event_queue.clone());
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Webhooks were already acknowledged; give queued work a bounded chance to finish.
    let drain = async {
        command_queue.idle().await;
        event_queue.idle().await;
    };
    let timeout = Duration::from_secs(config.shutdown_drain_timeout_secs);
    if tokio::time::timeout(timeout, drain).await.is_ok() {
        info!("Queues drained");
    } else {
        warn!(
            pending_commands = command_queue.len(),
            pending_events = event_queue.len(),
            "Shutdown drain timed out, dropping pending work"
        );
    }

    for worker in workers {
        worker.abort();
    }

    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal, cleaning up...");
}
