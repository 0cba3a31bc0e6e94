//! Events API Webhook Handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use super::EventJob;
use crate::api::AppState;
use crate::slack::EventRequest;

/// Acknowledge an Events API request and queue the event for processing.
pub async fn receive(State(state): State<AppState>, Json(request): Json<EventRequest>) -> Response {
    match request {
        EventRequest::UrlVerification { challenge } => {
            info!("Answered URL verification challenge");
            challenge.into_response()
        }
        EventRequest::EventCallback(callback) => {
            let job = EventJob::new(callback);

            info!(
                job_id = %job.id,
                event_id = %job.callback.event_id,
                event_type = %job.callback.event.kind,
                team_id = %job.callback.team_id,
                "Event received"
            );

            state.events.enqueue(job);
            StatusCode::OK.into_response()
        }
        EventRequest::Other => {
            warn!("Ignoring unsupported Events API request type");
            StatusCode::OK.into_response()
        }
    }
}
