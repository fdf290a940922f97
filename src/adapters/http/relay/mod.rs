//! Relay HTTP adapter: managed-transport event ingress and health.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, EventResponse, HealthResponse};
pub use handlers::{health, post_event};
pub use routes::relay_routes;
