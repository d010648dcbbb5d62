//! Step-scoped table store
//!
//! Same backward resolution as the record store, indexed additionally by
//! table name: one step may own several distinct named tabular datasets.
//! Unlike record slots, an unwritten table is a distinguishable not-found
//! fault rather than a silent empty default.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::cache::{CacheStore, CacheStoreExt};
use crate::domain::codec::TableSnapshot;

use super::error::WizardError;
use super::ids::validate_name;
use super::keys::KeyBuilder;
use super::layered::resolve_layered;

pub struct TableStore {
    store: Arc<dyn CacheStore>,
    keys: KeyBuilder,
    current_step: String,
    steps_newest_first: Vec<String>,
    tables: HashMap<String, TableSnapshot>,
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("current_step", &self.current_step)
            .field("cached", &self.tables.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TableStore {
    pub(crate) fn new(
        store: Arc<dyn CacheStore>,
        keys: KeyBuilder,
        current_step: String,
        steps_newest_first: Vec<String>,
    ) -> Self {
        Self {
            store,
            keys,
            current_step,
            steps_newest_first,
            tables: HashMap::new(),
        }
    }

    async fn resolve(&mut self, table: &str) -> Result<Option<&TableSnapshot>, WizardError> {
        if !self.tables.contains_key(table) {
            let store = Arc::clone(&self.store);
            let keys = self.keys.clone();
            let name = table.to_string();

            let found = resolve_layered(&self.steps_newest_first, move |step| {
                let store = Arc::clone(&store);
                let key = keys.table(&step, &name);
                async move { store.get_table(&key).await }
            })
            .await?;

            if let Some((step, snapshot)) = found {
                tracing::debug!(table, resolved_from = %step, "Resolved table");
                self.tables.insert(table.to_string(), snapshot);
            }
        }

        Ok(self.tables.get(table))
    }

    /// The named table, resolved through the step trail
    pub async fn get(&mut self, table: &str) -> Result<&TableSnapshot, WizardError> {
        // Split lookup keeps the borrow checker happy across the await
        self.resolve(table).await?;

        self.tables
            .get(table)
            .ok_or_else(|| WizardError::table_not_found(table))
    }

    /// Whether any step wrote the named table
    pub async fn contains(&mut self, table: &str) -> Result<bool, WizardError> {
        Ok(self.resolve(table).await?.is_some())
    }

    /// Writes the table into the current step's slot and caches it
    pub async fn insert(
        &mut self,
        table: impl Into<String>,
        snapshot: TableSnapshot,
    ) -> Result<(), WizardError> {
        let table = table.into();
        validate_name("table name", &table)?;

        let key = self.keys.table(&self.current_step, &table);
        self.store.set_table(&key, &snapshot).await?;
        self.tables.insert(table, snapshot);

        Ok(())
    }

    /// Every table name known to the instance
    ///
    /// Table names are not declared up front, so in-memory knowledge is
    /// merged with a key scan across every step's namespace; a table written
    /// by an earlier step and never touched since is still listed.
    pub async fn names(&self) -> Result<Vec<String>, WizardError> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();

        let keys = self.store.list_keys(&self.keys.table_scan_pattern()).await?;
        for key in &keys {
            if let Some(name) = KeyBuilder::table_name_from_key(key) {
                names.push(name.to_string());
            }
        }

        names.sort();
        names.dedup();

        Ok(names)
    }
}
