//! Connection registry configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Where live connection ids are stored.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Process memory; single node only.
    #[default]
    Memory,
    /// Redis hash; shared between nodes.
    Redis,
    /// PostgreSQL table; shared and durable.
    Postgres,
}

/// Connection registry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: RegistryBackend,

    /// Hash key (Redis) or table (PostgreSQL) holding connections
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Connection URL for Redis or PostgreSQL backends
    pub url: Option<String>,

    /// Maximum pooled connections (PostgreSQL)
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RegistryConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    /// Validate registry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::adapters::registry::validate_table_name(&self.table_name)
            .map_err(|e| ValidationError::InvalidTableName(e.to_string()))?;

        match self.backend {
            RegistryBackend::Memory => {}
            RegistryBackend::Redis => {
                if self.url().is_empty() {
                    return Err(ValidationError::MissingRequired("REGISTRY__URL"));
                }
                if !self.url().starts_with("redis://") && !self.url().starts_with("rediss://") {
                    return Err(ValidationError::InvalidRedisUrl);
                }
            }
            RegistryBackend::Postgres => {
                if self.url().is_empty() {
                    return Err(ValidationError::MissingRequired("REGISTRY__URL"));
                }
                if !self.url().starts_with("postgres://") && !self.url().starts_with("postgresql://")
                {
                    return Err(ValidationError::InvalidDatabaseUrl);
                }
                if self.pool_size == 0 || self.pool_size > 100 {
                    return Err(ValidationError::InvalidPoolSize);
                }
            }
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: RegistryBackend::default(),
            table_name: default_table_name(),
            url: None,
            pool_size: default_pool_size(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_table_name() -> String {
    "Connections".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.backend, RegistryBackend::Memory);
        assert_eq!(config.table_name, "Connections");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_requires_url() {
        let config = RegistryConfig {
            backend: RegistryBackend::Redis,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("REGISTRY__URL"))
        );
    }

    #[test]
    fn test_redis_url_scheme() {
        let config = RegistryConfig {
            backend: RegistryBackend::Redis,
            url: Some("http://localhost:6379".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRedisUrl));
    }

    #[test]
    fn test_postgres_url_scheme() {
        let config = RegistryConfig {
            backend: RegistryBackend::Postgres,
            url: Some("mysql://localhost/db".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDatabaseUrl));
    }

    #[test]
    fn test_table_name_must_be_identifier() {
        let config = RegistryConfig {
            table_name: "conn; DROP".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTableName(_))
        ));
    }
}
