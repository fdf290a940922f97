//! Request and response bodies for the relay HTTP endpoints.

use serde::Serialize;

use crate::application::{MessageOutcome, RelayOutcome};
use crate::domain::relay::ConnectionState;

/// Body returned for an event the relay handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    pub outcome: &'static str,
    /// Connection state after the event; `closed` tells the transport to drop it.
    pub state: ConnectionState,
}

impl From<RelayOutcome> for EventResponse {
    fn from(outcome: RelayOutcome) -> Self {
        let state = outcome.state();
        let outcome = match outcome {
            RelayOutcome::Connected => "connected",
            RelayOutcome::Disconnected => "disconnected",
            RelayOutcome::Message(MessageOutcome::Replied) => "replied",
            RelayOutcome::Message(MessageOutcome::ReportedError) => "reported_error",
            RelayOutcome::Message(MessageOutcome::RejectedInput) => "rejected_input",
            RelayOutcome::Message(MessageOutcome::PeerGone) => "peer_gone",
        };
        Self { outcome, state }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new("BAD_GATEWAY", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_response_names_outcome() {
        let response = EventResponse::from(RelayOutcome::Message(MessageOutcome::PeerGone));
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            serde_json::json!({"outcome": "peer_gone", "state": "closed"})
        );
    }

    #[test]
    fn error_response_carries_code() {
        let error = ErrorResponse::unauthorized("Unauthorized");
        assert_eq!(error.code, "UNAUTHORIZED");
        assert_eq!(error.message, "Unauthorized");
    }
}
