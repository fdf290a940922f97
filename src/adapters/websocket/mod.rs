//! Native WebSocket transport.
//!
//! ```text
//!  client ──GET /ws?token=..──▶ ws_handler ──authorize──▶ Relay
//!                                   │
//!                             attach/detach
//!                                   ▼
//!                             LocalGateway ◀──push── Relay
//!                                   │
//!                           per-socket channel
//!                                   ▼
//!                             socket send task
//! ```
//!
//! # Components
//!
//! - [`connections`] - In-process gateway keyed by connection id
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod connections;
pub mod handler;

pub use connections::LocalGateway;
pub use handler::{connect_token, websocket_router, ws_handler, ConnectQuery, WebSocketState};
