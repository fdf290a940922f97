//! Redis-backed connection registry for multi-node deployments.
//!
//! All connections live in one hash whose key is the configured table name:
//! field = connection id, value = RFC 3339 connect time. `HSET`/`HDEL` are
//! naturally idempotent, which is exactly the registry contract.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{ConnectionId, Timestamp};
use crate::domain::relay::ConnectionRecord;
use crate::ports::{ConnectionRegistry, RegistryError};

/// Redis hash connection registry.
#[derive(Clone)]
pub struct RedisConnectionRegistry {
    conn: MultiplexedConnection,
    table_name: String,
}

impl RedisConnectionRegistry {
    /// Create a registry storing connections under `table_name`.
    pub fn new(conn: MultiplexedConnection, table_name: impl Into<String>) -> Self {
        Self {
            conn,
            table_name: table_name.into(),
        }
    }

    /// Open a connection to `url` and build the registry.
    pub async fn connect(url: &str, table_name: impl Into<String>) -> Result<Self, RegistryError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self::new(conn, table_name))
    }
}

fn unavailable(e: redis::RedisError) -> RegistryError {
    RegistryError::Unavailable(e.to_string())
}

fn decode_record(field: String, value: String) -> Result<ConnectionRecord, RegistryError> {
    let connection_id = ConnectionId::new(field)
        .map_err(|e| RegistryError::Serialization(e.to_string()))?;
    let connected_at = Timestamp::parse_rfc3339(&value).ok_or_else(|| {
        RegistryError::Serialization(format!("invalid connect time '{}'", value))
    })?;
    Ok(ConnectionRecord::with_connected_at(connection_id, connected_at))
}

#[async_trait]
impl ConnectionRegistry for RedisConnectionRegistry {
    async fn register(&self, connection_id: &ConnectionId) -> Result<(), RegistryError> {
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(
            &self.table_name,
            connection_id.as_str(),
            Timestamp::now().to_rfc3339(),
        )
        .await
        .map_err(unavailable)
    }

    async fn deregister(&self, connection_id: &ConnectionId) -> Result<(), RegistryError> {
        let mut conn = self.conn.clone();
        conn.hdel::<_, _, ()>(&self.table_name, connection_id.as_str())
            .await
            .map_err(unavailable)
    }

    async fn contains(&self, connection_id: &ConnectionId) -> Result<bool, RegistryError> {
        let mut conn = self.conn.clone();
        conn.hexists(&self.table_name, connection_id.as_str())
            .await
            .map_err(unavailable)
    }

    async fn connections(&self) -> Result<Vec<ConnectionRecord>, RegistryError> {
        let mut conn = self.conn.clone();
        let entries: HashMap<String, String> =
            conn.hgetall(&self.table_name).await.map_err(unavailable)?;

        let mut records = entries
            .into_iter()
            .map(|(field, value)| decode_record(field, value))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| a.connection_id.cmp(&b.connection_id));
        Ok(records)
    }
}

impl std::fmt::Debug for RedisConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConnectionRegistry")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}
