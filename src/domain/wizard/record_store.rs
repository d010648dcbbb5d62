//! Step-scoped record store
//!
//! A map-like view over one record slot ("metadata" or "header") of a wizard
//! instance, read "as of" the current step. Reads resolve through the step
//! trail to the nearest earlier step that wrote the slot; writes always land
//! on the current step's own key, forking a fresh copy that an undo of the
//! current step cleanly discards.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::cache::{CacheStore, CacheStoreExt};
use crate::domain::codec::Record;
use crate::domain::DomainError;

use super::keys::{KeyBuilder, Slot};
use super::layered::resolve_layered;

pub struct RecordStore {
    store: Arc<dyn CacheStore>,
    keys: KeyBuilder,
    slot: Slot,
    current_step: String,
    steps_newest_first: Vec<String>,
    resolved: Option<Record>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("slot", &self.slot)
            .field("current_step", &self.current_step)
            .field("resolved", &self.resolved.is_some())
            .finish()
    }
}

impl RecordStore {
    /// `steps_newest_first` is the step-trail snapshot taken at session
    /// construction, reversed so index 0 is the most recent step.
    pub(crate) fn new(
        store: Arc<dyn CacheStore>,
        keys: KeyBuilder,
        slot: Slot,
        current_step: String,
        steps_newest_first: Vec<String>,
    ) -> Self {
        Self {
            store,
            keys,
            slot,
            current_step,
            steps_newest_first,
            resolved: None,
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Resolves the record once, then serves it from memory
    async fn resolve(&mut self) -> Result<&mut Record, DomainError> {
        if self.resolved.is_none() {
            let store = Arc::clone(&self.store);
            let keys = self.keys.clone();
            let slot = self.slot;

            let found = resolve_layered(&self.steps_newest_first, move |step| {
                let store = Arc::clone(&store);
                let key = keys.record(&step, slot);
                async move { store.get_record(&key).await }
            })
            .await?;

            let record = match found {
                Some((step, record)) => {
                    tracing::debug!(slot = %self.slot, resolved_from = %step, "Resolved record slot");
                    record
                }
                // No step ever wrote this slot: an empty record, not an error
                None => Record::new(),
            };

            self.resolved = Some(record);
        }

        Ok(self.resolved.as_mut().expect("resolved above"))
    }

    /// Persists the resolved record under the current step's key only
    async fn persist(&mut self) -> Result<(), DomainError> {
        let key = self.keys.record(&self.current_step, self.slot);
        let record = self.resolved.as_ref().expect("persist follows resolve");

        self.store.set_record(&key, record).await
    }

    pub async fn get(&mut self, field: &str) -> Result<Option<Value>, DomainError> {
        Ok(self.resolve().await?.get(field).cloned())
    }

    pub async fn contains_field(&mut self, field: &str) -> Result<bool, DomainError> {
        Ok(self.resolve().await?.contains_key(field))
    }

    pub async fn fields(&mut self) -> Result<Vec<String>, DomainError> {
        Ok(self.resolve().await?.keys().cloned().collect())
    }

    pub async fn len(&mut self) -> Result<usize, DomainError> {
        Ok(self.resolve().await?.len())
    }

    pub async fn is_empty(&mut self) -> Result<bool, DomainError> {
        Ok(self.resolve().await?.is_empty())
    }

    /// The full resolved record
    pub async fn as_map(&mut self) -> Result<&Record, DomainError> {
        Ok(&*self.resolve().await?)
    }

    /// Sets one field, returning the previous value
    pub async fn insert(
        &mut self,
        field: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, DomainError> {
        let previous = self.resolve().await?.insert(field.into(), value);
        self.persist().await?;

        Ok(previous)
    }

    /// Merges several fields in one write
    pub async fn extend(&mut self, fields: Record) -> Result<(), DomainError> {
        self.resolve().await?.extend(fields);
        self.persist().await
    }

    /// Removes one field, returning its value
    pub async fn remove(&mut self, field: &str) -> Result<Option<Value>, DomainError> {
        let previous = self.resolve().await?.remove(field);
        self.persist().await?;

        Ok(previous)
    }

    /// Empties the record for the current step onward
    pub async fn clear(&mut self) -> Result<(), DomainError> {
        self.resolve().await?.clear();
        self.persist().await
    }
}
