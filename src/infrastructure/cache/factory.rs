//! Cache backend factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use crate::domain::cache::CacheStore;
use crate::domain::DomainError;

use super::in_memory::{InMemoryStore, InMemoryStoreConfig};
use super::redis::{RedisStore, RedisStoreConfig};

/// Supported backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// In-memory store using moka
    #[default]
    InMemory,
    /// Redis store
    Redis,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::InMemory => write!(f, "in_memory"),
            BackendKind::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(BackendKind::InMemory),
            "redis" => Ok(BackendKind::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache backend: {}. Valid backends: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for the backend factory
#[derive(Debug, Clone, Default)]
pub struct CacheBackendConfig {
    /// Kind of backend to create
    pub kind: BackendKind,
    /// Redis URL (required for the Redis backend)
    pub redis_url: Option<String>,
    /// Key prefix for deployment-level namespacing (Redis only)
    pub key_prefix: Option<String>,
    /// Connection timeout (Redis only); the client default when `None`
    pub connection_timeout: Option<Duration>,
    /// Optional entry expiry; `None` leaves cleanup to explicit purges
    pub entry_ttl: Option<Duration>,
    /// Maximum capacity (in-memory only)
    pub max_capacity: Option<u64>,
}

impl CacheBackendConfig {
    /// Creates a configuration for the in-memory backend
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a configuration for the Redis backend
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the entry TTL
    pub fn with_entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = Some(ttl);
        self
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }
}

/// Builds cache stores from configuration
pub struct CacheBackendFactory;

impl CacheBackendFactory {
    /// Creates a store for the configured backend
    pub async fn create(config: &CacheBackendConfig) -> Result<Arc<dyn CacheStore>, DomainError> {
        match config.kind {
            BackendKind::InMemory => {
                let mut store_config = InMemoryStoreConfig::default();

                if let Some(capacity) = config.max_capacity {
                    store_config = store_config.with_max_capacity(capacity);
                }
                if let Some(ttl) = config.entry_ttl {
                    store_config = store_config.with_entry_ttl(ttl);
                }

                Ok(Arc::new(InMemoryStore::with_config(store_config)))
            }
            BackendKind::Redis => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("Redis backend requires a redis_url")
                })?;

                let mut store_config = RedisStoreConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    store_config = store_config.with_key_prefix(prefix.clone());
                }
                if let Some(timeout) = config.connection_timeout {
                    store_config = store_config.with_connection_timeout(timeout);
                }
                if let Some(ttl) = config.entry_ttl {
                    store_config = store_config.with_entry_ttl(ttl);
                }

                Ok(Arc::new(RedisStore::connect(store_config).await?))
            }
        }
    }
}
