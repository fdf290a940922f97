//! ConnectionGateway port - push frames to connected peers.
//!
//! A push either reaches the peer, finds the peer gone, or fails in the
//! transport itself. The first two are ordinary outcomes; only the last is
//! an error. Stale peers are detected here and nowhere else.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::Payload;

/// Result of a push that the transport handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Frame was handed to the peer's connection.
    Delivered,
    /// The connection id is no longer valid (peer gone).
    StalePeer,
}

/// Push failures other than a stale peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("gateway transport error: {0}")]
    Transport(String),
}

/// Port for delivering frames to a connection by id.
#[async_trait]
pub trait ConnectionGateway: Send + Sync {
    /// Push one frame to the given connection.
    async fn push(
        &self,
        connection_id: &ConnectionId,
        payload: Payload,
    ) -> Result<PushOutcome, GatewayError>;
}
