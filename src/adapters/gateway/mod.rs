//! Connection gateway adapters.
//!
//! ## Available Adapters
//!
//! - `CallbackGateway` - Managed WebSocket service callback API
//! - `RecordingGateway` - Records pushes for testing
//!
//! The in-process gateway for native sockets lives with the WebSocket
//! transport (`adapters::websocket::LocalGateway`).

mod callback;
mod recording;

pub use callback::CallbackGateway;
pub use recording::RecordingGateway;
