//! Recording gateway for testing.
//!
//! Remembers every frame pushed per connection. Connections can be marked
//! stale, and the whole gateway can be made to fail, to exercise the
//! relay's delivery paths.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::Payload;
use crate::ports::{ConnectionGateway, GatewayError, PushOutcome};

#[derive(Debug, Default)]
struct Recorded {
    pushes: Vec<(ConnectionId, Payload)>,
    stale: HashSet<ConnectionId>,
    failure: Option<String>,
}

/// Gateway that records pushes instead of delivering them.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes to this id report `StalePeer` from now on.
    pub fn mark_stale(&self, connection_id: &ConnectionId) {
        self.inner.lock().unwrap().stale.insert(connection_id.clone());
    }

    /// Every push fails with a transport error.
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.inner.lock().unwrap().failure = Some(message.into());
        self
    }

    /// All delivered frames, in push order.
    pub fn pushes(&self) -> Vec<(ConnectionId, Payload)> {
        self.inner.lock().unwrap().pushes.clone()
    }

    /// Frames delivered to one connection.
    pub fn pushed_to(&self, connection_id: &ConnectionId) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .pushes
            .iter()
            .filter(|(id, _)| id == connection_id)
            .map(|(_, payload)| payload.as_str().to_string())
            .collect()
    }

    pub fn push_count(&self) -> usize {
        self.inner.lock().unwrap().pushes.len()
    }
}

#[async_trait]
impl ConnectionGateway for RecordingGateway {
    async fn push(
        &self,
        connection_id: &ConnectionId,
        payload: Payload,
    ) -> Result<PushOutcome, GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.failure {
            return Err(GatewayError::Transport(message.clone()));
        }
        if inner.stale.contains(connection_id) {
            return Ok(PushOutcome::StalePeer);
        }
        inner.pushes.push((connection_id.clone(), payload));
        Ok(PushOutcome::Delivered)
    }
}
