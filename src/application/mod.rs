//! Application layer - event handling over the ports.
//!
//! The relay is driven by transport events and talks to the outside world
//! only through the traits in `crate::ports`.

pub mod handlers;

pub use handlers::{
    CompletionErrorPolicy, MessageOutcome, Relay, RelayError, RelayOutcome, RelaySettings,
};
