//! TokenValidator port - connect-time authorization.
//!
//! The relay only needs a yes/no answer for the token presented when a
//! connection is opened. Identity details stay with the identity provider.

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of validating a connect token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Failures that prevent a decision from being made.
///
/// Callers treat these as `Deny`; they are separate so they can be logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The validator is misconfigured.
    #[error("Auth misconfigured: {0}")]
    Misconfigured(String),

    /// The identity provider is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Validates the token presented at connect time.
///
/// # Contract
///
/// Implementations must:
/// - Return `Allow` only for tokens they positively verified
/// - Return `Deny` for malformed, expired or unknown tokens
/// - Return `Err` only when no decision could be made
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Decide whether a connection presenting `token` may be opened.
    async fn validate(&self, token: &str) -> Result<AccessDecision, AuthError>;
}
