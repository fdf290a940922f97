//! HTTP adapters.
//!
//! Builds the application router from the relay endpoints and, for the
//! native transport, the WebSocket endpoint.

pub mod relay;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, LocalGateway, WebSocketState};
use crate::application::Relay;

// Re-export key types for convenience
pub use relay::{relay_routes, ErrorResponse};

/// Assembles every route this deployment serves.
///
/// `local_gateway` is present when the relay pushes to sockets held by this
/// process; `/ws` is only mounted then.
pub fn app_router(relay: Relay, local_gateway: Option<Arc<LocalGateway>>) -> Router {
    let mut router = relay_routes(relay.clone());

    if let Some(gateway) = local_gateway {
        router = router.merge(websocket_router().with_state(WebSocketState::new(relay, gateway)));
    }

    router.layer(TraceLayer::new_for_http())
}
