//! Connection gateway configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which transport holds the sockets.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// This process serves `/ws` and holds the sockets.
    #[default]
    WebSocket,
    /// A managed service holds the sockets and posts events to `/events`.
    Callback,
}

/// Gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub mode: GatewayMode,

    /// Connection management endpoint of the managed service (callback mode)
    pub callback_endpoint: Option<String>,

    /// Bearer token for the callback endpoint
    pub callback_token: Option<Secret<String>>,

    /// Push timeout in seconds
    #[serde(default = "default_callback_timeout")]
    pub callback_timeout_secs: u64,
}

impl GatewayConfig {
    /// Get push timeout as Duration
    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }

    /// Validate gateway configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.mode != GatewayMode::Callback {
            return Ok(());
        }

        let endpoint = self
            .callback_endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(ValidationError::MissingRequired("GATEWAY__CALLBACK_ENDPOINT"))?;

        if production && !endpoint.starts_with("https://") {
            return Err(ValidationError::MustBeHttps("GATEWAY__CALLBACK_ENDPOINT"));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("GATEWAY__CALLBACK_ENDPOINT"));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: GatewayMode::default(),
            callback_endpoint: None,
            callback_token: None,
            callback_timeout_secs: default_callback_timeout(),
        }
    }
}

fn default_callback_timeout() -> u64 {
    10
}
