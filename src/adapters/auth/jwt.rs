//! JWT token validator (HS256 shared secret).
//!
//! Verifies the signature and expiry of the connect token, plus issuer and
//! audience when configured. Any verification failure is a `Deny`; the
//! relay only needs to know whether the connection may be opened.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::ports::{AccessDecision, AuthError, TokenValidator};

/// Claims the validator needs; everything else in the token is ignored.
#[derive(Debug, Deserialize)]
struct ConnectClaims {
    #[allow(dead_code)]
    exp: u64,
}

/// Validates HS256-signed JWTs.
pub struct JwtTokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenValidator {
    /// Creates a validator for tokens signed with `secret`.
    pub fn new(
        secret: &Secret<String>,
        issuer: Option<&str>,
        audience: Option<&str>,
    ) -> Result<Self, AuthError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(AuthError::Misconfigured("JWT secret is empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

#[async_trait]
impl TokenValidator for JwtTokenValidator {
    async fn validate(&self, token: &str) -> Result<AccessDecision, AuthError> {
        match decode::<ConnectClaims>(token, &self.key, &self.validation) {
            Ok(_) => Ok(AccessDecision::Allow),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("Token expired"),
                    ErrorKind::InvalidIssuer => tracing::warn!("Invalid issuer in token"),
                    ErrorKind::InvalidAudience => tracing::warn!("Invalid audience in token"),
                    _ => tracing::debug!("Token validation failed: {}", e),
                }
                Ok(AccessDecision::Deny)
            }
        }
    }
}
