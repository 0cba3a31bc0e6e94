//! Events API
//!
//! `/events` acknowledges immediately and queues an [`EventJob`]; the event
//! dispatcher handles events one at a time in arrival order.

pub mod handlers;
pub mod identity;
pub mod mention;

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

pub use identity::BotIdentityCache;

use crate::queue::{Dispatchable, Dispatcher, EventQueue};
use crate::slack::types::APP_MENTION;
use crate::slack::{ChatApi, EventCallback};

/// A queued event.
#[derive(Debug, Clone)]
pub struct EventJob {
    /// Correlates log lines for this event.
    pub id: Uuid,
    pub callback: EventCallback,
}

impl EventJob {
    pub fn new(callback: EventCallback) -> Self {
        Self {
            id: Uuid::now_v7(),
            callback,
        }
    }
}

impl Dispatchable for EventJob {
    fn kind(&self) -> Option<&str> {
        let kind = self.callback.event.kind.as_str();
        (!kind.is_empty()).then_some(kind)
    }
}

/// Shared dependencies of event handlers.
#[derive(Clone)]
pub struct EventContext {
    pub chat: Arc<dyn ChatApi>,
    pub identity: Arc<BotIdentityCache>,
    pub source_code_url: Arc<str>,
}

impl EventContext {
    pub fn new(chat: Arc<dyn ChatApi>, identity: Arc<BotIdentityCache>, source_code_url: &str) -> Self {
        Self {
            chat,
            identity,
            source_code_url: Arc::from(source_code_url),
        }
    }
}

/// Build the dispatcher for the event queue.
///
/// Event types without a handler are logged and dropped.
pub fn dispatcher(queue: EventQueue<EventJob>, ctx: EventContext) -> Dispatcher<EventJob> {
    Dispatcher::new("events", queue)
        .route(APP_MENTION, move |job: EventJob| {
            let ctx = ctx.clone();
            async move { mention::handle_mention(&ctx, &job.callback).await }
        })
        .fallback(|job: EventJob| async move {
            warn!(
                job_id = %job.id,
                event_type = %job.callback.event.kind,
                "Received unknown event"
            );
            anyhow::Ok(())
        })
}
