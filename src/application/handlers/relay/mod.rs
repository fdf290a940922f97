//! Relay handlers - connection lifecycle and message relay.

mod errors;
mod orchestrator;
mod settings;
mod thread_tracker;

pub use errors::{MessageOutcome, RelayError, RelayOutcome};
pub use orchestrator::Relay;
pub use settings::{CompletionErrorPolicy, RelaySettings};
pub use thread_tracker::completion_request;
