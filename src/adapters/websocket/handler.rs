//! WebSocket upgrade handler for the native relay transport.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Authorize the connect token (401 before any upgrade)
//! 2. Upgrade, assign a connection id and register it
//! 3. Relay every text or UTF-8 binary frame on its own task
//! 4. Deregister and detach on close

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::adapters::http::ErrorResponse;
use crate::application::Relay;
use crate::domain::foundation::{ConnectionId, StateMachine};
use crate::domain::relay::{decode_frame, ConnectionState, MessageError};

use super::LocalGateway;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub relay: Relay,
    /// Must be the same gateway the relay pushes through.
    pub gateway: Arc<LocalGateway>,
}

impl WebSocketState {
    pub fn new(relay: Relay, gateway: Arc<LocalGateway>) -> Self {
        Self { relay, gateway }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Token from `?token=`, falling back to an `Authorization: Bearer` header.
pub fn connect_token(query: &ConnectQuery, headers: &HeaderMap) -> Option<String> {
    query
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string)
        })
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?token=...`
pub async fn ws_handler(
    State(state): State<WebSocketState>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let token = connect_token(&query, &headers);
    if state.relay.authorize(token.as_deref()).await.is_err() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthorized("Unauthorized")),
        )
            .into_response();
    }

    let Some(ws) = ws else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Expected a WebSocket upgrade")),
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn advance(connection_id: &ConnectionId, from: ConnectionState, to: ConnectionState) -> ConnectionState {
    match from.transition_to(to) {
        Ok(next) => {
            tracing::trace!(connection_id = %connection_id, state = ?next, "Connection state changed");
            next
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Unexpected connection state change");
            to
        }
    }
}

/// Relays one frame body on its own task, or reports why it cannot be relayed.
fn spawn_relay(relay: &Relay, connection_id: &ConnectionId, body: Result<String, MessageError>) {
    let relay = relay.clone();
    let connection_id = connection_id.clone();
    tokio::spawn(async move {
        let result = match body {
            Ok(text) => relay.message(&connection_id, &text).await,
            Err(e) => relay.reject(&connection_id, e).await,
        };
        if let Err(e) = result {
            tracing::error!(connection_id = %connection_id, error = %e, "Message relay failed");
        }
    });
}

/// Handle an established WebSocket connection until either side closes it.
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let connection_id = ConnectionId::generate();
    let mut lifecycle = ConnectionState::Connecting;

    let mut outbound = state.gateway.attach(connection_id.clone()).await;
    if state.relay.open(&connection_id).await.is_err() {
        // Already logged by the relay; the client just sees the socket close.
        state.gateway.detach(&connection_id).await;
        return;
    }
    lifecycle = advance(&connection_id, lifecycle, ConnectionState::Open);

    let (mut sender, mut receiver) = socket.split();

    // Forward frames pushed through the gateway to the socket
    let mut send_task = {
        let connection_id = connection_id.clone();
        tokio::spawn(async move {
            while let Some(frame) = outbound.recv().await {
                if let Err(e) = sender.send(Message::Text(frame)).await {
                    tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                    break;
                }
            }
        })
    };

    // Relay inbound frames; one task each so a slow completion blocks nothing
    let mut recv_task = {
        let relay = state.relay.clone();
        let connection_id = connection_id.clone();
        tokio::spawn(async move {
            while let Some(result) = receiver.next().await {
                match result {
                    Ok(Message::Text(text)) => spawn_relay(&relay, &connection_id, Ok(text)),
                    Ok(Message::Binary(bytes)) => {
                        spawn_relay(&relay, &connection_id, decode_frame(bytes))
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => {
                        tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                        break;
                    }
                }
            }
        })
    };

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    lifecycle = advance(&connection_id, lifecycle, ConnectionState::Closing);
    if state.relay.disconnect(&connection_id).await.is_err() {
        tracing::warn!(connection_id = %connection_id, "Connection left in registry after close");
    }
    state.gateway.detach(&connection_id).await;
    advance(&connection_id, lifecycle, ConnectionState::Closed);
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
