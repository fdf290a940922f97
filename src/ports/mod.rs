//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the relay and the outside world. Adapters implement these ports.
//!
//! - `ConnectionRegistry` - Durable record of live connections
//! - `CompletionClient` - Conversational completion service
//! - `ConnectionGateway` - Push frames to a connection by id
//! - `TokenValidator` - Connect-time authorization

mod completion_client;
mod connection_gateway;
mod connection_registry;
mod token_validator;

pub use completion_client::{
    CompletionClient, CompletionError, CompletionFailureKind, CompletionReply, CompletionRequest,
    ModelParameters,
};
pub use connection_gateway::{ConnectionGateway, GatewayError, PushOutcome};
pub use connection_registry::{ConnectionRegistry, RegistryError};
pub use token_validator::{AccessDecision, AuthError, TokenValidator};
