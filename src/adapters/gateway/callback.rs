//! Callback gateway for managed WebSocket services.
//!
//! Managed transports keep the sockets themselves and expose a connection
//! management endpoint: `POST {endpoint}/@connections/{id}` delivers a
//! frame, and `410 Gone` means the connection no longer exists.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::Payload;
use crate::ports::{ConnectionGateway, GatewayError, PushOutcome};

/// Pushes frames through a managed transport's callback API.
pub struct CallbackGateway {
    endpoint: String,
    token: Option<Secret<String>>,
    client: Client,
}

impl CallbackGateway {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<Secret<String>>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn connection_url(&self, connection_id: &ConnectionId) -> String {
        format!("{}/@connections/{}", self.endpoint, connection_id)
    }
}

/// Maps a callback response status to a push outcome.
fn push_outcome(status: StatusCode) -> Result<PushOutcome, GatewayError> {
    if status.is_success() {
        Ok(PushOutcome::Delivered)
    } else if status == StatusCode::GONE {
        Ok(PushOutcome::StalePeer)
    } else {
        Err(GatewayError::Transport(format!(
            "callback returned {}",
            status
        )))
    }
}

#[async_trait]
impl ConnectionGateway for CallbackGateway {
    async fn push(
        &self,
        connection_id: &ConnectionId,
        payload: Payload,
    ) -> Result<PushOutcome, GatewayError> {
        let mut request = self
            .client
            .post(self.connection_url(connection_id))
            .body(payload.into_string());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let outcome = push_outcome(response.status())?;
        tracing::debug!(connection_id = %connection_id, outcome = ?outcome, "Callback push");
        Ok(outcome)
    }
}
