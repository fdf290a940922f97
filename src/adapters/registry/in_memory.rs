//! In-memory connection registry for tests and single-node deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::ConnectionRecord;
use crate::ports::{ConnectionRegistry, RegistryError};

/// Connection registry held in process memory.
///
/// Lost on restart, which is fine for the native WebSocket transport since
/// its connections die with the process too.
#[derive(Debug, Default)]
pub struct InMemoryConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, ConnectionRecord>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connection_id: &ConnectionId) -> Result<(), RegistryError> {
        self.connections
            .write()
            .await
            .insert(connection_id.clone(), ConnectionRecord::new(connection_id.clone()));
        Ok(())
    }

    async fn deregister(&self, connection_id: &ConnectionId) -> Result<(), RegistryError> {
        self.connections.write().await.remove(connection_id);
        Ok(())
    }

    async fn contains(&self, connection_id: &ConnectionId) -> Result<bool, RegistryError> {
        Ok(self.connections.read().await.contains_key(connection_id))
    }

    async fn connections(&self) -> Result<Vec<ConnectionRecord>, RegistryError> {
        let mut records: Vec<_> = self.connections.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.connection_id.cmp(&b.connection_id));
        Ok(records)
    }
}
