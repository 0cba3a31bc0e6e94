//! Bot Identity Cache
//!
//! Mention handling needs the bot's own user id to recognise `<@BOT>`.
//! Looking it up costs an `auth.test` round trip, so results are cached per
//! team. Entries expire after a fixed TTL and can be invalidated explicitly
//! (e.g. after the app is reinstalled).

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::slack::{ChatApi, ChatApiError};

#[derive(Debug, Clone)]
struct CachedIdentity {
    user_id: String,
    fetched_at: Instant,
}

/// Per-team cache of the bot's user id.
pub struct BotIdentityCache {
    chat: Arc<dyn ChatApi>,
    ttl: Duration,
    entries: DashMap<String, CachedIdentity>,
}

impl BotIdentityCache {
    pub fn new(chat: Arc<dyn ChatApi>, ttl: Duration) -> Self {
        Self {
            chat,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// The bot's user id in `team`, from cache when fresh.
    pub async fn user_id(&self, team: &str) -> Result<String, ChatApiError> {
        if let Some(entry) = self.entries.get(team) {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.user_id.clone());
            }
        }

        let identity = self.chat.auth_test().await?;
        debug!(team, user_id = %identity.user_id, "Resolved bot identity");

        self.entries.insert(
            team.to_string(),
            CachedIdentity {
                user_id: identity.user_id.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(identity.user_id)
    }

    /// Forget the cached identity for `team`.
    pub fn invalidate(&self, team: &str) {
        self.entries.remove(team);
    }

    /// Forget every cached identity.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
