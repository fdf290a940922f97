//! Relay errors and outcomes.

use thiserror::Error;

use crate::domain::relay::ConnectionState;
use crate::ports::{CompletionError, GatewayError, RegistryError};

/// Hard failures surfaced to the invoking transport.
///
/// Stale peers and malformed input are handled inside the relay and never
/// appear here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Connect token missing or rejected; no state was created.
    #[error("authorization denied")]
    AuthorizationDenied,

    /// The connection registry could not be updated.
    #[error("connection registry failure: {0}")]
    Storage(#[from] RegistryError),

    /// The completion service failed in a way that must reach operators.
    #[error("completion failure: {0}")]
    Completion(#[from] CompletionError),

    /// The gateway failed for a reason other than a stale peer.
    #[error(transparent)]
    Transport(#[from] GatewayError),
}

/// How a message event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Reply pushed to the peer.
    Replied,
    /// Completion failed; a best-effort error report was pushed.
    ReportedError,
    /// Payload could not be parsed; the parse error was pushed.
    RejectedInput,
    /// The peer was gone when pushing; the connection was deregistered.
    PeerGone,
}

/// How any relay event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Connected,
    Disconnected,
    Message(MessageOutcome),
}

impl RelayOutcome {
    /// Connection state after the event.
    pub fn state(&self) -> ConnectionState {
        match self {
            RelayOutcome::Connected => ConnectionState::Open,
            RelayOutcome::Disconnected | RelayOutcome::Message(MessageOutcome::PeerGone) => {
                ConnectionState::Closed
            }
            RelayOutcome::Message(_) => ConnectionState::Open,
        }
    }
}
