//! Slash Commands
//!
//! `/commands` acknowledges immediately and queues a [`CommandJob`]; the
//! command dispatcher replies in the background, one command at a time.

pub mod builtin;
pub mod handlers;

use std::sync::Arc;

use uuid::Uuid;

use crate::queue::{Dispatchable, Dispatcher, EventQueue};
use crate::slack::{ChatApi, CommandPayload};

/// Commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Say hi, bro.
    Bro,
    /// List available commands.
    Help,
}

impl Command {
    /// Every command, in the order `help` lists them.
    pub const ALL: &'static [Self] = &[Self::Bro, Self::Help];

    /// Keyword form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bro => "bro",
            Self::Help => "help",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued slash command invocation.
#[derive(Debug, Clone)]
pub struct CommandJob {
    /// Correlates log lines for this invocation.
    pub id: Uuid,
    /// Leading word of the command text, lowercased.
    pub keyword: Option<String>,
    pub payload: CommandPayload,
}

impl CommandJob {
    pub fn new(payload: CommandPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            keyword: leading_keyword(&payload.text),
            payload,
        }
    }
}

impl Dispatchable for CommandJob {
    fn kind(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}

/// First run of word characters at the very start of `text`, lowercased.
fn leading_keyword(text: &str) -> Option<String> {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    (end > 0).then(|| text[..end].to_lowercase())
}

/// Build the dispatcher for the command queue.
///
/// Unknown or empty commands fall back to `help`.
pub fn dispatcher(queue: EventQueue<CommandJob>, chat: Arc<dyn ChatApi>) -> Dispatcher<CommandJob> {
    let bro_chat = Arc::clone(&chat);
    let bro = move |job: CommandJob| {
        let chat = Arc::clone(&bro_chat);
        async move { builtin::bro(chat.as_ref(), &job.payload).await }
    };

    let help = move |job: CommandJob| {
        let chat = Arc::clone(&chat);
        async move { builtin::help(chat.as_ref(), &job.payload.response_url).await }
    };

    Dispatcher::new("commands", queue)
        .route(Command::Bro.as_str(), bro)
        .route(Command::Help.as_str(), help.clone())
        .fallback(help)
}
