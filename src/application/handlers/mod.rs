//! Application handlers.
//!
//! Handlers that orchestrate domain operations over the ports.

pub mod relay;

pub use relay::{
    completion_request, CompletionErrorPolicy, MessageOutcome, Relay, RelayError, RelayOutcome,
    RelaySettings,
};
