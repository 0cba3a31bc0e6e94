//! `app_mention` Replies

use anyhow::Context;

use super::EventContext;
use crate::slack::EventCallback;

const SOURCE_CODE_TRIGGER: &str = "your source code";

/// Choose the reply to a mention once the bot's user id is known.
pub fn compose_reply(text: &str, user: &str, bot_user_id: &str) -> String {
    let text = text.trim();
    let mention = format!("<@{bot_user_id}>");

    if text == mention {
        return format!("<@{user}>?");
    }

    match text.replacen(&mention, "", 1).trim().to_lowercase().as_str() {
        "ping" => "pong".to_string(),
        "version" => format!("I am running on version {}", env!("CARGO_PKG_VERSION")),
        _ => "I don't know what to do with my hands".to_string(),
    }
}

/// Answer a mention in the channel it came from.
pub async fn handle_mention(ctx: &EventContext, callback: &EventCallback) -> anyhow::Result<()> {
    let event = &callback.event;

    let reply = if event.text.contains(SOURCE_CODE_TRIGGER) {
        ctx.source_code_url.to_string()
    } else {
        // Events from shared channels carry their own team; fall back to the envelope's.
        let team = if event.team.is_empty() {
            callback.team_id.as_str()
        } else {
            event.team.as_str()
        };
        let bot_user_id = ctx
            .identity
            .user_id(team)
            .await
            .context("resolving bot identity")?;
        compose_reply(&event.text, &event.user, &bot_user_id)
    };

    ctx.chat
        .post_message(&event.channel, &reply)
        .await
        .with_context(|| format!("replying in {}", event.channel))?;
    Ok(())
}
