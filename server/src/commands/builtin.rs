//! Built-in Command Replies

use anyhow::Context;

use super::Command;
use crate::slack::types::DIRECT_MESSAGE_CHANNEL;
use crate::slack::{ChatApi, CommandPayload, ResponseMessage};

/// `bro` refuses to work in DMs and otherwise messages the invoking user.
pub async fn bro(chat: &dyn ChatApi, payload: &CommandPayload) -> anyhow::Result<()> {
    if payload.channel_name == DIRECT_MESSAGE_CHANNEL {
        chat.respond(
            &payload.response_url,
            &ResponseMessage::text("bro you can't do that here bro"),
        )
        .await
        .context("replying to bro in a direct message")?;
    } else {
        chat.post_message(&payload.user_id, "bro")
            .await
            .with_context(|| format!("messaging {}", payload.user_id))?;
    }
    Ok(())
}

/// Text listing every available command.
pub fn help_text() -> String {
    let names: Vec<String> = Command::ALL.iter().map(ToString::to_string).collect();
    format!("Available commands:\n{}", names.join("\n"))
}

/// Ephemeral command list, sent to the invocation's `response_url`.
pub async fn help(chat: &dyn ChatApi, response_url: &str) -> anyhow::Result<()> {
    chat.respond(response_url, &ResponseMessage::ephemeral(help_text()))
        .await
        .context("sending help")?;
    Ok(())
}
