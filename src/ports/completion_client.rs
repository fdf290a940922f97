//! Completion Client Port - Interface for the conversational completion service.
//!
//! The relay hands one user message, an optional thread continuation token
//! and the deployment's behavioural instructions to the service and gets the
//! reply text plus the token for the next turn.
//!
//! # Design
//!
//! - Provider-agnostic request/reply types
//! - System prompt and model parameters come from the caller, never from
//!   the client, so one client serves every behavioural preset
//! - Error variants are classified as auth, transient or other so the relay
//!   can decide who gets to see them
//! - No retries: retry policy belongs to the caller
//!
//! # Example
//!
//! ```ignore
//! let reply = client
//!     .complete(CompletionRequest::new("make a button blue", prompt_text))
//!     .await?;
//! peer.send(reply.text);
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::relay::ContinuationToken;

/// Port for completion service interactions.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate one reply.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError>;
}

/// Generation parameters configurable per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
    /// Randomness (0.0 = deterministic).
    pub temperature: f32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            max_output_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// Request for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The user's message.
    pub text: String,
    /// Token from the previous reply in this thread, if any.
    pub continuation: Option<ContinuationToken>,
    /// Rendered system instructions.
    pub system_prompt: String,
    /// Generation parameters.
    pub parameters: ModelParameters,
}

impl CompletionRequest {
    /// Creates a request that starts a new thread with default parameters.
    pub fn new(text: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            continuation: None,
            system_prompt: system_prompt.into(),
            parameters: ModelParameters::default(),
        }
    }

    /// Continues an existing thread.
    pub fn with_continuation(mut self, token: Option<ContinuationToken>) -> Self {
        self.continuation = token;
        self
    }

    /// Sets the generation parameters.
    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Reply from the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReply {
    /// Generated text.
    pub text: String,
    /// Token to send with the next message of this thread.
    pub continuation: ContinuationToken,
}

impl CompletionReply {
    pub fn new(text: impl Into<String>, continuation: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            continuation: ContinuationToken::new(continuation),
        }
    }
}

/// How the relay should treat a completion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFailureKind {
    /// Credentials or quota; an operator problem, never shown to peers.
    Auth,
    /// Rate limit, timeout, outage; worth telling the peer to try again.
    Transient,
    /// Anything else (bad request, unreadable response).
    Other,
}

/// Completion service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Account has no remaining quota.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Request did not finish within the deadline.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider rejected the request shape.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CompletionError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Classifies the error for the relay.
    pub fn kind(&self) -> CompletionFailureKind {
        match self {
            CompletionError::AuthenticationFailed | CompletionError::QuotaExceeded(_) => {
                CompletionFailureKind::Auth
            }
            CompletionError::RateLimited { .. }
            | CompletionError::Timeout { .. }
            | CompletionError::Unavailable(_)
            | CompletionError::Network(_) => CompletionFailureKind::Transient,
            CompletionError::Parse(_) | CompletionError::InvalidRequest(_) => {
                CompletionFailureKind::Other
            }
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind() == CompletionFailureKind::Auth
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == CompletionFailureKind::Transient
    }

    /// Text that is safe to show to a peer.
    ///
    /// Provider response bodies are left out; they can echo request details.
    pub fn peer_message(&self) -> String {
        match self {
            CompletionError::RateLimited { retry_after_secs } => format!(
                "The assistant is busy right now. Please try again in {} seconds.",
                retry_after_secs
            ),
            CompletionError::Timeout { .. } => {
                "The assistant took too long to answer. Please try again.".to_string()
            }
            CompletionError::Unavailable(_) | CompletionError::Network(_) => {
                "The assistant is temporarily unavailable. Please try again.".to_string()
            }
            CompletionError::Parse(_) | CompletionError::InvalidRequest(_) => {
                "The assistant could not answer this message.".to_string()
            }
            CompletionError::AuthenticationFailed | CompletionError::QuotaExceeded(_) => {
                "The assistant is unavailable.".to_string()
            }
        }
    }
}
