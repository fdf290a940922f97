//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the relay to external systems:
//! - `registry` - Connection registry (in-memory, Redis, PostgreSQL)
//! - `ai` - Completion service clients (OpenAI, mock)
//! - `auth` - Connect-token validators (JWT, static list)
//! - `gateway` - Push through a managed transport, or record for tests
//! - `websocket` - Native WebSocket transport and its local gateway
//! - `http` - Axum router: event ingress, health, WebSocket endpoint

pub mod ai;
pub mod auth;
pub mod gateway;
pub mod http;
pub mod registry;
pub mod websocket;
