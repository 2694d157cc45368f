use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use tracing::{info, warn};

use eventlog_common::NewLogEvent;

use crate::AppState;

/// `POST /api/events`: stamp, publish, and return the accepted event.
///
/// The response carries `id: null`; the id is assigned later, when the
/// consumer persists the event.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewLogEvent>,
) -> impl IntoResponse {
    let event = body.into_event(Utc::now());

    if let Err(e) = state.producer.publish(&event) {
        warn!(error = %e, "Failed to publish event");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to publish event"})),
        )
            .into_response();
    }

    info!(message_len = event.message().len(), "Event accepted");
    Json(event).into_response()
}

/// `GET /api/events`: everything in the cache list, in append order.
pub async fn list_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.cache.list().await {
        Ok(events) => Json(events).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to read cached events");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to read events"})),
            )
                .into_response()
        }
    }
}
