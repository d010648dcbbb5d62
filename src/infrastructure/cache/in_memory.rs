//! In-memory cache store implementation using moka
//!
//! Doubles as the injected test double for every component that takes a
//! `CacheStore`, and as a single-process deployment option.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache as MokaCache;
use regex::Regex;

use crate::domain::cache::CacheStore;
use crate::domain::DomainError;

/// Configuration for the in-memory store
#[derive(Debug, Clone)]
pub struct InMemoryStoreConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Optional expiry for entries; `None` means entries live until an
    /// explicit purge, matching the caller-managed wizard lifecycle
    pub entry_ttl: Option<Duration>,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
            entry_ttl: None,
        }
    }
}

impl InMemoryStoreConfig {
    /// Sets the maximum capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the entry TTL
    pub fn with_entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = Some(ttl);
        self
    }
}

/// Thread-safe in-memory byte store
#[derive(Debug)]
pub struct InMemoryStore {
    cache: MokaCache<String, Bytes>,
}

impl InMemoryStore {
    /// Creates a store with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryStoreConfig::default())
    }

    /// Creates a store with the given configuration
    pub fn with_config(config: InMemoryStoreConfig) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.entry_ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }

    fn matching_keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let regex = glob_to_regex(pattern)?;

        Ok(self
            .cache
            .iter()
            .map(|(key, _)| key.as_ref().clone())
            .filter(|key| regex.is_match(key))
            .collect())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles a glob-style pattern to an anchored regex
///
/// Only `*` is a wildcard; everything else matches literally. Anchoring
/// mirrors the backend's MATCH semantics, where a pattern covers the whole
/// key rather than any substring.
fn glob_to_regex(pattern: &str) -> Result<Regex, DomainError> {
    let mut translated = String::with_capacity(pattern.len() + 2);
    translated.push('^');

    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            ch => translated.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }

    translated.push('$');

    Regex::new(&translated)
        .map_err(|e| DomainError::cache(format!("Invalid pattern '{}': {}", pattern, e)))
}

#[async_trait]
impl CacheStore for InMemoryStore {
    async fn get_bytes(&self, key: &str) -> Result<Option<Bytes>, DomainError> {
        Ok(self.cache.get(key).await)
    }

    async fn set_bytes(&self, key: &str, value: Bytes) -> Result<(), DomainError> {
        self.cache.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn delete_by_prefix(&self, pattern: &str) -> Result<usize, DomainError> {
        // Scan-then-delete, same as the networked backend
        let keys = self.matching_keys(pattern)?;
        let count = keys.len();

        for key in keys {
            self.cache.remove(&key).await;
        }

        Ok(count)
    }

    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let mut keys = self.matching_keys(pattern)?;
        keys.sort();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryStore::new();

        store
            .set_bytes("wf:u1:s1:metadata", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        let value = store.get_bytes("wf:u1:s1:metadata").await.unwrap();
        assert_eq!(value, Some(Bytes::from_static(b"{}")));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = InMemoryStore::new();

        assert_eq!(store.get_bytes("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces() {
        let store = InMemoryStore::new();

        store.set_bytes("k", Bytes::from_static(b"a")).await.unwrap();
        store.set_bytes("k", Bytes::from_static(b"b")).await.unwrap();

        assert_eq!(
            store.get_bytes("k").await.unwrap(),
            Some(Bytes::from_static(b"b"))
        );
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = InMemoryStore::new();
        store.set_bytes("k", Bytes::from_static(b"a")).await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_prefix_matches_whole_key() {
        let store = InMemoryStore::new();
        store.set_bytes("wf:u1:a", Bytes::from_static(b"1")).await.unwrap();
        store.set_bytes("wf:u1:b", Bytes::from_static(b"2")).await.unwrap();
        store.set_bytes("xwf:u1:c", Bytes::from_static(b"3")).await.unwrap();

        let removed = store.delete_by_prefix("wf:u1:*").await.unwrap();

        assert_eq!(removed, 2);
        assert!(store.get_bytes("xwf:u1:c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_keys_by_pattern() {
        let store = InMemoryStore::new();
        store
            .set_bytes("wf:u1:s1:tables:t1", Bytes::from_static(b"1"))
            .await
            .unwrap();
        store
            .set_bytes("wf:u1:s2:tables:t2", Bytes::from_static(b"2"))
            .await
            .unwrap();
        store
            .set_bytes("wf:u1:s1:metadata", Bytes::from_static(b"3"))
            .await
            .unwrap();

        let keys = store.list_keys("wf:u1:*:tables:*").await.unwrap();

        assert_eq!(
            keys,
            vec![
                "wf:u1:s1:tables:t1".to_string(),
                "wf:u1:s2:tables:t2".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_pattern_escapes_regex_metacharacters() {
        let store = InMemoryStore::new();
        store.set_bytes("wf.u1:a", Bytes::from_static(b"1")).await.unwrap();
        store.set_bytes("wfxu1:a", Bytes::from_static(b"2")).await.unwrap();

        // '.' in the pattern is literal, not "any character"
        let keys = store.list_keys("wf.u1:*").await.unwrap();
        assert_eq!(keys, vec!["wf.u1:a".to_string()]);
    }

    #[test]
    fn test_ttl_configuration() {
        let config = InMemoryStoreConfig::default().with_entry_ttl(Duration::from_secs(60));

        assert_eq!(config.entry_ttl, Some(Duration::from_secs(60)));
        let _store = InMemoryStore::with_config(config);
    }
}
