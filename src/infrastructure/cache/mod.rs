//! Cache infrastructure - store implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::{BackendKind, CacheBackendConfig, CacheBackendFactory};
pub use in_memory::{InMemoryStore, InMemoryStoreConfig};
pub use redis::{RedisStore, RedisStoreConfig};
