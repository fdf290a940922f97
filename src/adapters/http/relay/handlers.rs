//! HTTP handlers for the managed-transport event ingress.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{Relay, RelayError};
use crate::domain::relay::RelayEvent;

use super::dto::{ErrorResponse, EventResponse, HealthResponse};

/// POST /events - Handle one connect, disconnect or message event
pub async fn post_event(State(relay): State<Relay>, Json(event): Json<RelayEvent>) -> Response {
    let kind = event.kind();
    let connection_id = event.connection_id().clone();

    match relay.handle(event).await {
        Ok(outcome) => (StatusCode::OK, Json(EventResponse::from(outcome))).into_response(),
        Err(e) => {
            tracing::debug!(connection_id = %connection_id, event = kind, error = %e, "Event failed");
            handle_relay_error(e)
        }
    }
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_relay_error(error: RelayError) -> Response {
    match error {
        RelayError::AuthorizationDenied => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthorized("Unauthorized")),
        )
            .into_response(),
        RelayError::Completion(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::bad_gateway("Completion service failed")),
        )
            .into_response(),
        RelayError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal("Connection registry unavailable")),
        )
            .into_response(),
        RelayError::Transport(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal("Failed to deliver reply")),
        )
            .into_response(),
    }
}
