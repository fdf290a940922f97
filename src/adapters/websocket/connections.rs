//! Live WebSocket connections held by this process.
//!
//! Each accepted socket gets an unbounded outbound channel keyed by its
//! connection id. The relay pushes frames through [`LocalGateway`]; the
//! socket's send task drains the channel.
//!
//! # Thread Safety
//!
//! Uses `RwLock` for the connection map since pushes (reads) vastly
//! outnumber attaches/detaches (writes).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::Payload;
use crate::ports::{ConnectionGateway, GatewayError, PushOutcome};

/// Gateway for sockets accepted by this process.
#[derive(Debug, Default)]
pub struct LocalGateway {
    connections: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>,
}

impl LocalGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a socket and returns the receiver its send task drains.
    ///
    /// Attaching an id twice replaces the earlier channel, which closes it.
    pub async fn attach(&self, connection_id: ConnectionId) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(connection_id, tx);
        rx
    }

    /// Forgets a socket. Unknown ids are ignored.
    pub async fn detach(&self, connection_id: &ConnectionId) {
        self.connections.write().await.remove(connection_id);
    }

    /// Number of attached sockets.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[async_trait]
impl ConnectionGateway for LocalGateway {
    async fn push(
        &self,
        connection_id: &ConnectionId,
        payload: Payload,
    ) -> Result<PushOutcome, GatewayError> {
        let connections = self.connections.read().await;
        let Some(sender) = connections.get(connection_id) else {
            return Ok(PushOutcome::StalePeer);
        };

        match sender.send(payload.into_string()) {
            Ok(()) => {
                tracing::debug!(connection_id = %connection_id, "Pushed frame");
                Ok(PushOutcome::Delivered)
            }
            // Receiver dropped: the socket's send task has ended.
            Err(_) => Ok(PushOutcome::StalePeer),
        }
    }
}
