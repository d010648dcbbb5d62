//! Cache store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::codec::{
    decode_record, decode_string_list, decode_table, encode_record, encode_string_list,
    encode_table, Record, TableSnapshot,
};
use crate::domain::DomainError;

/// Byte-level key-value store backing the wizard state
///
/// This is the sole network-facing seam: every other component talks to the
/// backend through it, never through a client library directly. Operations
/// are single blocking round-trips; faults propagate unmodified and no retry
/// policy lives at this layer.
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    /// Gets the raw bytes stored under a key
    async fn get_bytes(&self, key: &str) -> Result<Option<Bytes>, DomainError>;

    /// Stores raw bytes under a key, replacing any previous value
    async fn set_bytes(&self, key: &str, value: Bytes) -> Result<(), DomainError>;

    /// Deletes one key, returning whether it existed. Absent keys are not an
    /// error.
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Deletes every key matching a glob-style pattern, returning the count
    ///
    /// Implemented as scan-then-delete, not atomically: a concurrent writer
    /// during the purge is an accepted race.
    async fn delete_by_prefix(&self, pattern: &str) -> Result<usize, DomainError>;

    /// Enumerates keys matching a glob-style pattern
    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, DomainError>;
}

/// Extension trait providing typed get/set operations built on the codec
pub trait CacheStoreExt: CacheStore {
    /// Gets a structured record, `None` when the key is absent
    fn get_record<'a>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<Record>, DomainError>> + Send {
        async move {
            match self.get_bytes(key).await? {
                Some(bytes) => Ok(Some(decode_record(&bytes)?)),
                None => Ok(None),
            }
        }
    }

    /// Stores a structured record
    fn set_record<'a>(
        &'a self,
        key: &'a str,
        record: &'a Record,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send {
        async move { self.set_bytes(key, encode_record(record)?).await }
    }

    /// Gets a tabular snapshot, `None` when the key is absent
    fn get_table<'a>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<TableSnapshot>, DomainError>> + Send {
        async move {
            match self.get_bytes(key).await? {
                Some(bytes) => Ok(Some(decode_table(&bytes)?)),
                None => Ok(None),
            }
        }
    }

    /// Stores a tabular snapshot
    fn set_table<'a>(
        &'a self,
        key: &'a str,
        table: &'a TableSnapshot,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send {
        async move { self.set_bytes(key, encode_table(table)?).await }
    }

    /// Gets an ordered string list, empty when the key is absent
    fn get_string_list<'a>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, DomainError>> + Send {
        async move {
            match self.get_bytes(key).await? {
                Some(bytes) => decode_string_list(&bytes),
                None => Ok(Vec::new()),
            }
        }
    }

    /// Stores an ordered string list as a full overwrite
    fn set_string_list<'a>(
        &'a self,
        key: &'a str,
        list: &'a [String],
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send {
        async move { self.set_bytes(key, encode_string_list(list)?).await }
    }
}

// Blanket implementation for all types implementing CacheStore
impl<T: CacheStore + ?Sized> CacheStoreExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::InMemoryStore;
    use serde_json::json;

    fn record_with(field: &str, value: serde_json::Value) -> Record {
        let mut record = Record::new();
        record.insert(field.to_string(), value);
        record
    }

    #[tokio::test]
    async fn test_record_convenience_round_trip() {
        let store = InMemoryStore::new();
        let record = record_with("project_id", json!(5));

        store.set_record("wf:u1:s1:metadata", &record).await.unwrap();
        let loaded = store.get_record("wf:u1:s1:metadata").await.unwrap();

        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn test_record_absent_is_none() {
        let store = InMemoryStore::new();

        let loaded = store.get_record("wf:u1:s1:metadata").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_string_list_absent_is_empty() {
        let store = InMemoryStore::new();

        let list = store.get_string_list("wf:u1:steps").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_string_list_overwrite() {
        let store = InMemoryStore::new();

        store
            .set_string_list("wf:u1:steps", &["a".to_string()])
            .await
            .unwrap();
        store
            .set_string_list("wf:u1:steps", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        let list = store.get_string_list("wf:u1:steps").await.unwrap();
        assert_eq!(list, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupted_record_surfaces_codec_error() {
        let store = InMemoryStore::new();
        store
            .set_bytes("wf:u1:s1:metadata", Bytes::from_static(b"{broken"))
            .await
            .unwrap();

        let result = store.get_record("wf:u1:s1:metadata").await;
        assert!(matches!(result, Err(DomainError::Codec { .. })));
    }
}
