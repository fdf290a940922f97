//! Relay - connection lifecycle and message relay.
//!
//! Each event is handled on its own: the relay keeps no state between
//! calls, and everything that outlives one event lives in the connection
//! registry. Cloning a `Relay` is cheap and clones share collaborators.
//!
//! # Message flow
//!
//! 1. Parse the frame; report parse failures back to the same connection
//! 2. Build the completion request with this deployment's prompt
//! 3. Call the completion service under the configured deadline
//! 4. Push the reply (or a best-effort error report) through the gateway
//! 5. A stale peer on push deregisters the connection and is not an error

use std::sync::Arc;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{InboundMessage, MessageError, OutboundReply, Payload, RelayEvent};
use crate::ports::{
    AccessDecision, CompletionClient, CompletionError, CompletionReply, CompletionRequest,
    ConnectionGateway, ConnectionRegistry, PushOutcome, TokenValidator,
};

use super::thread_tracker::completion_request;
use super::{CompletionErrorPolicy, MessageOutcome, RelayError, RelayOutcome, RelaySettings};

/// Orchestrates connect, disconnect and message events.
#[derive(Clone)]
pub struct Relay {
    registry: Arc<dyn ConnectionRegistry>,
    completions: Arc<dyn CompletionClient>,
    gateway: Arc<dyn ConnectionGateway>,
    validator: Arc<dyn TokenValidator>,
    settings: Arc<RelaySettings>,
}

impl Relay {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        completions: Arc<dyn CompletionClient>,
        gateway: Arc<dyn ConnectionGateway>,
        validator: Arc<dyn TokenValidator>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            registry,
            completions,
            gateway,
            validator,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Dispatches one transport event.
    pub async fn handle(&self, event: RelayEvent) -> Result<RelayOutcome, RelayError> {
        match event {
            RelayEvent::Connect {
                connection_id,
                token,
            } => {
                self.connect(&connection_id, token.as_deref()).await?;
                Ok(RelayOutcome::Connected)
            }
            RelayEvent::Disconnect { connection_id } => {
                self.disconnect(&connection_id).await?;
                Ok(RelayOutcome::Disconnected)
            }
            RelayEvent::Message {
                connection_id,
                body,
            } => {
                let outcome = self.message(&connection_id, &body).await?;
                Ok(RelayOutcome::Message(outcome))
            }
        }
    }

    /// Checks a connect token without touching the registry.
    ///
    /// Transports that must answer the handshake before a connection id
    /// exists call this first and [`Relay::open`] once upgraded.
    pub async fn authorize(&self, token: Option<&str>) -> Result<(), RelayError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::info!("Rejecting connection without token");
            return Err(RelayError::AuthorizationDenied);
        };

        match self.validator.validate(token).await {
            Ok(AccessDecision::Allow) => Ok(()),
            Ok(AccessDecision::Deny) => {
                tracing::info!("Rejecting connection with invalid token");
                Err(RelayError::AuthorizationDenied)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token validation failed, denying connection");
                Err(RelayError::AuthorizationDenied)
            }
        }
    }

    /// Authorizes and registers a connection.
    pub async fn connect(
        &self,
        connection_id: &ConnectionId,
        token: Option<&str>,
    ) -> Result<(), RelayError> {
        self.authorize(token).await?;
        self.open(connection_id).await
    }

    /// Registers an already-authorized connection.
    pub async fn open(&self, connection_id: &ConnectionId) -> Result<(), RelayError> {
        self.registry.register(connection_id).await.map_err(|e| {
            tracing::error!(connection_id = %connection_id, error = %e, "Failed to register connection");
            RelayError::Storage(e)
        })?;

        tracing::info!(connection_id = %connection_id, "Connection opened");
        Ok(())
    }

    /// Deregisters a connection. Unknown ids are fine.
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> Result<(), RelayError> {
        self.registry.deregister(connection_id).await.map_err(|e| {
            tracing::error!(connection_id = %connection_id, error = %e, "Failed to deregister connection");
            RelayError::Storage(e)
        })?;

        tracing::info!(connection_id = %connection_id, "Connection closed");
        Ok(())
    }

    /// Relays one inbound frame and pushes the answer back.
    pub async fn message(
        &self,
        connection_id: &ConnectionId,
        body: &str,
    ) -> Result<MessageOutcome, RelayError> {
        let message = match InboundMessage::parse(body) {
            Ok(message) => message,
            Err(e) => return self.reject(connection_id, e).await,
        };

        let request = completion_request(message, &self.settings);

        match self.complete(request).await {
            Ok(reply) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    continuation = %reply.continuation,
                    "Completion received"
                );
                let reply = OutboundReply::new(reply.text, Some(reply.continuation));
                let payload = self.settings.encoding.encode_reply(&reply);
                self.deliver(connection_id, payload, MessageOutcome::Replied)
                    .await
            }
            Err(e) if e.is_auth_failure() => {
                tracing::error!(
                    connection_id = %connection_id,
                    error = %e,
                    "Completion service rejected credentials"
                );
                Err(RelayError::Completion(e))
            }
            Err(e) => match self.settings.on_completion_error {
                CompletionErrorPolicy::Propagate => {
                    tracing::error!(connection_id = %connection_id, error = %e, "Completion failed");
                    Err(RelayError::Completion(e))
                }
                CompletionErrorPolicy::ReportToPeer => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        transient = e.is_transient(),
                        "Completion failed, reporting to peer"
                    );
                    let payload = self.settings.encoding.encode_error(&e.peer_message());
                    self.deliver(connection_id, payload, MessageOutcome::ReportedError)
                        .await
                }
            },
        }
    }

    /// Reports an unusable inbound frame back to the connection that sent it.
    pub async fn reject(
        &self,
        connection_id: &ConnectionId,
        error: MessageError,
    ) -> Result<MessageOutcome, RelayError> {
        tracing::debug!(connection_id = %connection_id, error = %error, "Rejecting malformed message");
        let payload = self.settings.encoding.encode_error(&error.to_string());
        self.deliver(connection_id, payload, MessageOutcome::RejectedInput)
            .await
    }

    /// Calls the completion service, abandoning it at the deadline.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError> {
        let deadline = self.settings.completion_deadline;
        match tokio::time::timeout(deadline, self.completions.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout {
                timeout_secs: deadline.as_secs(),
            }),
        }
    }

    /// Pushes a frame; a stale peer is deregistered and reported as `PeerGone`.
    async fn deliver(
        &self,
        connection_id: &ConnectionId,
        payload: Payload,
        on_delivered: MessageOutcome,
    ) -> Result<MessageOutcome, RelayError> {
        match self.gateway.push(connection_id, payload).await {
            Ok(PushOutcome::Delivered) => Ok(on_delivered),
            Ok(PushOutcome::StalePeer) => {
                tracing::info!(connection_id = %connection_id, "Found stale connection, deregistering");
                if let Err(e) = self.registry.deregister(connection_id).await {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "Failed to deregister stale connection"
                    );
                }
                Ok(MessageOutcome::PeerGone)
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Push failed");
                Err(RelayError::Transport(e))
            }
        }
    }
}
