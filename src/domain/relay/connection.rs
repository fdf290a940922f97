//! Connection lifecycle types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConnectionId, StateMachine, Timestamp};

/// What the connection registry stores for one live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub connection_id: ConnectionId,
    pub connected_at: Timestamp,
}

impl ConnectionRecord {
    /// Creates a record stamped with the current time.
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            connected_at: Timestamp::now(),
        }
    }

    /// Creates a record with an explicit connect time (used by store adapters).
    pub fn with_connected_at(connection_id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            connection_id,
            connected_at,
        }
    }
}

/// Lifecycle of a single connection as seen by the relay.
///
/// ```text
/// Connecting ──authorize──▶ Open ──(message)*──▶ Closing ──▶ Closed
///      │                                                      ▲
///      └──────────────────────── deny ────────────────────────┘
/// ```
///
/// `Closed` is absorbing; a reconnect is a new connection id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Connecting, Open)
                | (Connecting, Closed)
                | (Open, Open)
                | (Open, Closing)
                | (Open, Closed)
                | (Closing, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Connecting => vec![Open, Closed],
            Open => vec![Open, Closing, Closed],
            Closing => vec![Closed],
            Closed => vec![],
        }
    }
}
