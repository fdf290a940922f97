//! ConnectionRegistry port - durable record of live connections.
//!
//! The relay registers a connection once the transport has authorized it
//! and removes it on disconnect or when a push reveals the peer is gone.
//! The transport routes pushes by connection id on its own, so the relay
//! never reads the registry on the message path; the read operations exist
//! for enumeration and operators.
//!
//! # Example
//!
//! ```ignore
//! // On connect:
//! registry.register(&connection_id).await?;
//!
//! // On disconnect (or stale-peer cleanup):
//! registry.deregister(&connection_id).await?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::ConnectionRecord;

/// Errors that can occur in connection registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Backing store could not be reached or rejected the command.
    #[error("registry store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded.
    #[error("registry serialization error: {0}")]
    Serialization(String),
}

/// Port for tracking live connections.
///
/// Implementations must:
/// - Make `register` an upsert (registering twice is not an error)
/// - Make `deregister` succeed for unknown ids
/// - Be safe under concurrent calls; same-id races are last-write-wins
/// - Report store failures without retrying
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Record a connection as live, overwriting any previous record.
    async fn register(&self, connection_id: &ConnectionId) -> Result<(), RegistryError>;

    /// Forget a connection. Succeeds if it was never registered.
    async fn deregister(&self, connection_id: &ConnectionId) -> Result<(), RegistryError>;

    /// Check whether a connection is currently registered.
    async fn contains(&self, connection_id: &ConnectionId) -> Result<bool, RegistryError>;

    /// List every registered connection.
    async fn connections(&self) -> Result<Vec<ConnectionRecord>, RegistryError>;
}
