//! Slash Command Webhook Handler

use axum::{extract::State, http::StatusCode, Form};
use tracing::info;

use super::CommandJob;
use crate::api::AppState;
use crate::slack::CommandPayload;

/// Acknowledge a slash command and queue it for processing.
///
/// Slack expects an answer within three seconds, so nothing slow runs here.
pub async fn receive(
    State(state): State<AppState>,
    Form(payload): Form<CommandPayload>,
) -> StatusCode {
    let job = CommandJob::new(payload);

    info!(
        job_id = %job.id,
        keyword = job.keyword.as_deref().unwrap_or(""),
        user_id = %job.payload.user_id,
        channel_id = %job.payload.channel_id,
        "Slash command received"
    );

    state.commands.enqueue(job);
    StatusCode::OK
}
