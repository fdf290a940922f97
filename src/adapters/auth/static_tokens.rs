//! Static allow-list token validator.
//!
//! For deployments that hand out long-lived shared tokens. Comparison is
//! constant-time so response timing does not leak token prefixes.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

use crate::ports::{AccessDecision, AuthError, TokenValidator};

/// Allows exactly the configured tokens.
pub struct StaticTokenValidator {
    tokens: Vec<Secret<String>>,
}

impl StaticTokenValidator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .map(Secret::new)
                .collect(),
        }
    }

    /// Parses a comma-separated list, trimming whitespace around entries.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<AccessDecision, AuthError> {
        if self.tokens.is_empty() {
            return Err(AuthError::Misconfigured(
                "no static tokens configured".to_string(),
            ));
        }

        // Check every entry so the time taken does not depend on the match position.
        let matched = self.tokens.iter().fold(false, |found, candidate| {
            let equal: bool = candidate
                .expose_secret()
                .as_bytes()
                .ct_eq(token.as_bytes())
                .into();
            found | equal
        });

        Ok(if matched {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_listed_tokens_only() {
        let validator = StaticTokenValidator::new(["T1", "T2"]);
        assert_eq!(validator.validate("T1").await.unwrap(), AccessDecision::Allow);
        assert_eq!(validator.validate("T2").await.unwrap(), AccessDecision::Allow);
        assert_eq!(validator.validate("T3").await.unwrap(), AccessDecision::Deny);
        assert_eq!(validator.validate("T").await.unwrap(), AccessDecision::Deny);
    }

    #[test]
    fn from_list_trims_and_skips_blanks() {
        let validator = StaticTokenValidator::from_list(" T1, ,T2 ,");
        assert_eq!(validator.tokens.len(), 2);
    }

    #[tokio::test]
    async fn empty_list_is_misconfigured() {
        let validator = StaticTokenValidator::from_list("");
        assert!(validator.tokens.is_empty());
        assert!(matches!(
            validator.validate("T1").await,
            Err(AuthError::Misconfigured(_))
        ));
    }
}
