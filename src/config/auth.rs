//! Connect-token authorization configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// How connect tokens are checked.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// HS256-signed JWTs.
    #[default]
    Jwt,
    /// Fixed list of shared tokens.
    Static,
}

/// Authorization configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// Shared HS256 secret (jwt mode)
    pub jwt_secret: Option<Secret<String>>,

    /// Expected `iss` claim, if any
    pub issuer: Option<String>,

    /// Expected `aud` claim, if any
    pub audience: Option<String>,

    /// Comma-separated allow-list (static mode)
    pub static_tokens: Option<Secret<String>>,
}

impl AuthConfig {
    fn has_jwt_secret(&self) -> bool {
        self.jwt_secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty())
    }

    fn has_static_tokens(&self) -> bool {
        self.static_tokens
            .as_ref()
            .is_some_and(|s| s.expose_secret().split(',').any(|t| !t.trim().is_empty()))
    }

    /// Validate authorization configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.mode {
            AuthMode::Jwt if !self.has_jwt_secret() => {
                Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
            }
            AuthMode::Static if !self.has_static_tokens() => {
                Err(ValidationError::MissingRequired("AUTH__STATIC_TOKENS"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_mode_requires_secret() {
        let config = AuthConfig::default();
        assert_eq!(config.mode, AuthMode::Jwt);
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );

        let config = AuthConfig {
            jwt_secret: Some(Secret::new("s3cret".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_static_mode_requires_tokens() {
        let config = AuthConfig {
            mode: AuthMode::Static,
            static_tokens: Some(Secret::new(" , ".to_string())),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AUTH__STATIC_TOKENS"))
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig {
            jwt_secret: Some(Secret::new("hunter2".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
