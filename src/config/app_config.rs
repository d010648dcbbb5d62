use std::time::Duration;

use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::{BackendKind, CacheBackendConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Backend kind: "in_memory" or "redis"
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    /// Entry expiry in seconds; absent means explicit-purge-only lifecycle
    pub entry_ttl_secs: Option<u64>,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
            entry_ttl_secs: None,
            connection_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl CacheSettings {
    /// Resolves the settings into a factory configuration
    pub fn backend_config(&self) -> Result<CacheBackendConfig, DomainError> {
        let kind: BackendKind = self.backend.parse()?;

        Ok(CacheBackendConfig {
            kind,
            redis_url: self.redis_url.clone(),
            key_prefix: self.key_prefix.clone(),
            connection_timeout: Some(Duration::from_secs(self.connection_timeout_secs)),
            entry_ttl: self.entry_ttl_secs.map(Duration::from_secs),
            max_capacity: None,
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("WIZARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
