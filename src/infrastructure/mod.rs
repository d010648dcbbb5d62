//! Infrastructure layer - backing implementations

pub mod cache;
pub mod observability;

pub use cache::{
    BackendKind, CacheBackendConfig, CacheBackendFactory, InMemoryStore, InMemoryStoreConfig,
    RedisStore, RedisStoreConfig,
};
