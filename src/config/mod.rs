//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CHAT_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use chat_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod auth;
mod completion;
mod error;
mod gateway;
mod registry;
mod relay;
mod server;

pub use auth::{AuthConfig, AuthMode};
pub use completion::{CompletionConfig, MAX_COMPLETION_TIMEOUT_SECS};
pub use error::{ConfigError, ValidationError};
pub use gateway::{GatewayConfig, GatewayMode};
pub use registry::{RegistryBackend, RegistryConfig};
pub use relay::{Preset, RelayConfig};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Where live connections are recorded
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Connect-token authorization
    #[serde(default)]
    pub auth: AuthConfig,

    /// Completion service (OpenAI)
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Prompt, encoding and error policy
    #[serde(default)]
    pub relay: RelayConfig,

    /// How replies reach peers
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CHAT_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAT_RELAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CHAT_RELAY__REGISTRY__TABLE_NAME=Connections` -> `registry.table_name`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.registry.validate()?;
        self.auth.validate()?;
        self.completion.validate()?;
        self.relay.validate()?;
        self.gateway.validate(self.is_production())?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "CHAT_RELAY__AUTH__JWT_SECRET",
        "CHAT_RELAY__COMPLETION__API_KEY",
        "CHAT_RELAY__COMPLETION__TIMEOUT_SECS",
        "CHAT_RELAY__SERVER__PORT",
        "CHAT_RELAY__SERVER__ENVIRONMENT",
        "CHAT_RELAY__REGISTRY__BACKEND",
        "CHAT_RELAY__REGISTRY__TABLE_NAME",
        "CHAT_RELAY__RELAY__ON_COMPLETION_ERROR",
        "CHAT_RELAY__RELAY__REPLY_ENCODING",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        env::set_var("CHAT_RELAY__AUTH__JWT_SECRET", "test-secret");
        env::set_var("CHAT_RELAY__COMPLETION__API_KEY", "sk-test");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.completion.has_api_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.registry.backend, RegistryBackend::Memory);
        assert_eq!(config.registry.table_name, "Connections");
        assert_eq!(config.completion.timeout_secs, 300);
        assert_eq!(config.gateway.mode, GatewayMode::WebSocket);
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CHAT_RELAY__SERVER__PORT", "3000");
        env::set_var("CHAT_RELAY__REGISTRY__BACKEND", "redis");
        env::set_var("CHAT_RELAY__REGISTRY__TABLE_NAME", "WsConnections");
        env::set_var("CHAT_RELAY__RELAY__ON_COMPLETION_ERROR", "propagate");
        env::set_var("CHAT_RELAY__RELAY__REPLY_ENCODING", "plain_text");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.registry.backend, RegistryBackend::Redis);
        assert_eq!(config.registry.table_name, "WsConnections");
        assert_eq!(
            config.relay.on_completion_error,
            crate::application::CompletionErrorPolicy::Propagate
        );
        assert_eq!(
            config.relay.reply_encoding,
            crate::domain::relay::ReplyEncoding::PlainText
        );
        // Redis without a URL does not validate
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_completion_timeout_ceiling() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CHAT_RELAY__COMPLETION__TIMEOUT_SECS", "1200");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidCompletionTimeout)
        );
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CHAT_RELAY__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }
}
