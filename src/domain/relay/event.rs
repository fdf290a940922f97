//! Transport events consumed by the relay.

use serde::Deserialize;

use crate::domain::foundation::ConnectionId;

/// One event delivered by a transport.
///
/// Each case carries only the fields valid for it. Deserializes from the
/// managed-transport ingress shape:
///
/// ```json
/// {"type": "connect", "connectionId": "abc", "token": "..."}
/// {"type": "disconnect", "connectionId": "abc"}
/// {"type": "message", "connectionId": "abc", "body": "{\"text\":\"hi\"}"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    #[serde(rename_all = "camelCase")]
    Connect {
        connection_id: ConnectionId,
        #[serde(default)]
        token: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Disconnect { connection_id: ConnectionId },
    #[serde(rename_all = "camelCase")]
    Message {
        connection_id: ConnectionId,
        body: String,
    },
}

impl RelayEvent {
    /// The connection this event concerns.
    pub fn connection_id(&self) -> &ConnectionId {
        match self {
            RelayEvent::Connect { connection_id, .. }
            | RelayEvent::Disconnect { connection_id }
            | RelayEvent::Message { connection_id, .. } => connection_id,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayEvent::Connect { .. } => "connect",
            RelayEvent::Disconnect { .. } => "disconnect",
            RelayEvent::Message { .. } => "message",
        }
    }
}
