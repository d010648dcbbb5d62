//! Wizard session - the orchestrator for one step of one instance
//!
//! A session is constructed per request for `(workflow, instance, current
//! step)`. Construction registers the step with the tracker and snapshots
//! the step trail once; the scoped stores all resolve against that snapshot,
//! so a concurrent undo by another actor is not reflected until a new
//! session is constructed. The session stores the trail only - which step
//! comes next is the business of the external transition layer.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::cache::CacheStore;
use crate::domain::DomainError;

use super::error::WizardError;
use super::ids::{validate_name, InstanceId, WorkflowName};
use super::keys::{KeyBuilder, Slot};
use super::record_store::RecordStore;
use super::step_list::{pop_last_step, StepTracker};
use super::table_store::TableStore;

/// Well-known metadata field accumulating free-text notes
pub const COMMENTS_FIELD: &str = "comments";

/// A free-text note attached to the instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Where in the flow the note was taken (e.g. a step or form section)
    #[serde(default)]
    pub context: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
}

/// Human-readable state dump, a diagnostic aid only
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub workflow: String,
    pub instance: String,
    pub current_step: String,
    pub steps: Vec<String>,
    pub tables: Vec<String>,
    pub metadata_fields: Vec<String>,
    pub header_fields: Vec<String>,
}

impl fmt::Display for DebugSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "wizard {}:{}", self.workflow, self.instance)?;
        writeln!(f, "  current step: {}", self.current_step)?;
        writeln!(f, "  steps: {}", self.steps.join(" -> "))?;
        writeln!(f, "  tables: {}", self.tables.join(", "))?;
        writeln!(f, "  metadata fields: {}", self.metadata_fields.join(", "))?;
        write!(f, "  header fields: {}", self.header_fields.join(", "))
    }
}

pub struct WizardSession {
    workflow: WorkflowName,
    instance: InstanceId,
    current_step: String,
    store: Arc<dyn CacheStore>,
    keys: KeyBuilder,
    tracker: StepTracker,
    metadata: RecordStore,
    header: RecordStore,
    tables: TableStore,
}

impl std::fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardSession")
            .field("workflow", &self.workflow)
            .field("instance", &self.instance)
            .field("current_step", &self.current_step)
            .finish()
    }
}

impl WizardSession {
    /// Opens a session for one step of one instance
    ///
    /// A fresh time-ordered instance id is generated when none is supplied.
    /// Entering a step always registers it with the tracker, even before any
    /// data is written.
    pub async fn begin(
        store: Arc<dyn CacheStore>,
        workflow: WorkflowName,
        instance: Option<InstanceId>,
        current_step: impl Into<String>,
    ) -> Result<Self, WizardError> {
        let current_step = current_step.into();
        validate_name("step name", &current_step)?;

        let instance = instance.unwrap_or_else(InstanceId::generate);
        let keys = KeyBuilder::new(&workflow, &instance);

        let mut tracker = StepTracker::new(Arc::clone(&store), &keys);
        tracker.add(&current_step).await?;

        let mut steps_newest_first = tracker.steps().await?.to_vec();
        steps_newest_first.reverse();

        tracing::debug!(
            workflow = %workflow,
            instance = %instance,
            step = %current_step,
            "Opened wizard session"
        );

        let metadata = RecordStore::new(
            Arc::clone(&store),
            keys.clone(),
            Slot::Metadata,
            current_step.clone(),
            steps_newest_first.clone(),
        );
        let header = RecordStore::new(
            Arc::clone(&store),
            keys.clone(),
            Slot::Header,
            current_step.clone(),
            steps_newest_first.clone(),
        );
        let tables = TableStore::new(
            Arc::clone(&store),
            keys.clone(),
            current_step.clone(),
            steps_newest_first,
        );

        Ok(Self {
            workflow,
            instance,
            current_step,
            store,
            keys,
            tracker,
            metadata,
            header,
            tables,
        })
    }

    pub fn workflow(&self) -> &WorkflowName {
        &self.workflow
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }

    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    /// The metadata record slot, resolved as of the current step
    pub fn metadata(&mut self) -> &mut RecordStore {
        &mut self.metadata
    }

    /// The header record slot, resolved as of the current step
    pub fn header(&mut self) -> &mut RecordStore {
        &mut self.header
    }

    /// The named tables of the instance, resolved as of the current step
    pub fn tables(&mut self) -> &mut TableStore {
        &mut self.tables
    }

    /// The visited steps, oldest first
    pub async fn steps(&mut self) -> Result<Vec<String>, WizardError> {
        Ok(self.tracker.steps().await?.to_vec())
    }

    /// Appends a timestamped note to the `comments` metadata field
    ///
    /// The field is resolved like any other metadata read, so notes taken at
    /// earlier steps carry forward; the updated list forks onto the current
    /// step. A pre-existing batch list under the field is preserved and
    /// extended.
    pub async fn add_comment(
        &mut self,
        context: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), WizardError> {
        let comment = Comment {
            context: context.into(),
            text: text.into(),
            at: Some(Utc::now()),
        };

        let mut notes = match self.metadata.get(COMMENTS_FIELD).await? {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        let encoded = serde_json::to_value(&comment)
            .map_err(|e| DomainError::codec(format!("Failed to encode comment: {}", e)))?;
        notes.push(encoded);

        self.metadata.insert(COMMENTS_FIELD, Value::Array(notes)).await?;
        Ok(())
    }

    /// The accumulated notes, oldest first
    ///
    /// Plain-string entries (a batch written by an earlier importer) are
    /// returned as context-less comments without a timestamp.
    pub async fn comments(&mut self) -> Result<Vec<Comment>, WizardError> {
        let Some(Value::Array(items)) = self.metadata.get(COMMENTS_FIELD).await? else {
            return Ok(Vec::new());
        };

        let comments = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(Comment {
                    context: String::new(),
                    text,
                    at: None,
                }),
                other => serde_json::from_value(other).ok(),
            })
            .collect();

        Ok(comments)
    }

    /// Purges the entire instance namespace
    ///
    /// Called by the terminal step after relational persistence succeeded.
    /// Unconditional; afterwards every read under the instance sees the
    /// defined absent/default behavior.
    pub async fn complete(self) -> Result<(), WizardError> {
        let removed = self
            .store
            .delete_by_prefix(&self.keys.instance_pattern())
            .await?;

        tracing::info!(
            workflow = %self.workflow,
            instance = %self.instance,
            keys_removed = removed,
            "Completed wizard instance"
        );

        Ok(())
    }

    /// Undoes the most recent step of an instance and returns the step the
    /// caller should re-render
    ///
    /// Any open session for the instance keeps resolving against its own
    /// trail snapshot; construct a new session to observe the undo.
    pub async fn undo_last_step(
        store: Arc<dyn CacheStore>,
        workflow: &WorkflowName,
        instance: &InstanceId,
    ) -> Result<Option<String>, WizardError> {
        Ok(pop_last_step(store, workflow, instance).await?)
    }

    /// Snapshot of the session state for diagnostics
    pub async fn debug_snapshot(&mut self) -> Result<DebugSnapshot, WizardError> {
        let steps = self.tracker.steps().await?.to_vec();
        let tables = self.tables.names().await?;
        let metadata_fields = self.metadata.fields().await?;
        let header_fields = self.header.fields().await?;

        Ok(DebugSnapshot {
            workflow: self.workflow.to_string(),
            instance: self.instance.to_string(),
            current_step: self.current_step.clone(),
            steps,
            tables,
            metadata_fields,
            header_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheStoreExt;
    use crate::domain::codec::{Column, TableSnapshot};
    use crate::infrastructure::cache::InMemoryStore;
    use serde_json::json;

    fn fixtures() -> (Arc<dyn CacheStore>, WorkflowName, InstanceId) {
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryStore::new());
        let workflow = WorkflowName::new("library_annotation").unwrap();
        let instance = InstanceId::new("u1").unwrap();
        (store, workflow, instance)
    }

    async fn session_at(
        store: &Arc<dyn CacheStore>,
        workflow: &WorkflowName,
        instance: &InstanceId,
        step: &str,
    ) -> WizardSession {
        WizardSession::begin(
            Arc::clone(store),
            workflow.clone(),
            Some(instance.clone()),
            step,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_begin_registers_current_step() {
        let (store, workflow, instance) = fixtures();

        let mut session = session_at(&store, &workflow, &instance, "project_select").await;

        assert_eq!(session.steps().await.unwrap(), ["project_select"]);
        assert_eq!(session.current_step(), "project_select");
    }

    #[tokio::test]
    async fn test_begin_generates_instance_id_when_absent() {
        let (store, workflow, _) = fixtures();

        let session = WizardSession::begin(store, workflow, None, "project_select")
            .await
            .unwrap();

        assert!(!session.instance().as_str().is_empty());
    }

    #[tokio::test]
    async fn test_begin_rejects_invalid_step_name() {
        let (store, workflow, instance) = fixtures();

        let result =
            WizardSession::begin(store, workflow, Some(instance), "bad:step").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_metadata_inherits_across_steps() {
        let (store, workflow, instance) = fixtures();

        let mut first = session_at(&store, &workflow, &instance, "project_select").await;
        first.metadata().insert("project_id", json!(5)).await.unwrap();

        let mut second = session_at(&store, &workflow, &instance, "sample_annotation").await;
        assert_eq!(
            second.metadata().get("project_id").await.unwrap(),
            Some(json!(5))
        );
    }

    #[tokio::test]
    async fn test_undo_scenario() {
        let (store, workflow, instance) = fixtures();

        let mut first = session_at(&store, &workflow, &instance, "project_select").await;
        first.metadata().insert("project_id", json!(5)).await.unwrap();

        let mut second = session_at(&store, &workflow, &instance, "sample_annotation").await;
        second.metadata().insert("sample_count", json!(96)).await.unwrap();

        let new_last = WizardSession::undo_last_step(Arc::clone(&store), &workflow, &instance)
            .await
            .unwrap();
        assert_eq!(new_last, Some("project_select".to_string()));

        // The surviving step still resolves its own data; the popped step's
        // keys are gone from the backend.
        let mut reopened = session_at(&store, &workflow, &instance, "project_select").await;
        assert_eq!(
            reopened.metadata().get("project_id").await.unwrap(),
            Some(json!(5))
        );
        assert_eq!(reopened.metadata().get("sample_count").await.unwrap(), None);

        let keys = KeyBuilder::new(&workflow, &instance);
        let leftover = store
            .list_keys(&keys.step_pattern("sample_annotation"))
            .await
            .unwrap();
        assert!(leftover.is_empty());
    }

    #[tokio::test]
    async fn test_complete_purges_instance() {
        let (store, workflow, instance) = fixtures();

        let mut session = session_at(&store, &workflow, &instance, "project_select").await;
        session.metadata().insert("project_id", json!(5)).await.unwrap();
        session
            .tables()
            .insert(
                "library_table",
                TableSnapshot::from_columns(vec![Column::int64("id", vec![Some(1)])]).unwrap(),
            )
            .await
            .unwrap();

        session.complete().await.unwrap();

        let keys = KeyBuilder::new(&workflow, &instance);
        let leftover = store.list_keys(&keys.instance_pattern()).await.unwrap();
        assert!(leftover.is_empty());

        // Subsequent reads see the defined absent/default behavior
        let mut fresh = session_at(&store, &workflow, &instance, "project_select").await;
        assert_eq!(fresh.metadata().get("project_id").await.unwrap(), None);
        assert!(matches!(
            fresh.tables().get("library_table").await,
            Err(WizardError::TableNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_comments_accumulate_across_steps() {
        let (store, workflow, instance) = fixtures();

        let mut first = session_at(&store, &workflow, &instance, "project_select").await;
        first.add_comment("project_select", "low input DNA").await.unwrap();

        let mut second = session_at(&store, &workflow, &instance, "sample_annotation").await;
        second
            .add_comment("sample_annotation", "re-check barcodes")
            .await
            .unwrap();

        let comments = second.comments().await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "low input DNA");
        assert_eq!(comments[1].text, "re-check barcodes");
        assert!(comments[1].at.is_some());
    }

    #[tokio::test]
    async fn test_comments_preserve_pre_existing_batch() {
        let (store, workflow, instance) = fixtures();

        // A batch list written directly by an importer, plain strings
        let keys = KeyBuilder::new(&workflow, &instance);
        let mut seeded = crate::domain::codec::Record::new();
        seeded.insert(
            COMMENTS_FIELD.to_string(),
            json!(["imported note a", "imported note b"]),
        );
        store
            .set_record(&keys.record("project_select", Slot::Metadata), &seeded)
            .await
            .unwrap();

        let mut session = session_at(&store, &workflow, &instance, "project_select").await;
        session.add_comment("project_select", "fresh note").await.unwrap();

        let comments = session.comments().await.unwrap();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].text, "imported note a");
        assert!(comments[0].at.is_none());
        assert_eq!(comments[2].text, "fresh note");
    }

    #[tokio::test]
    async fn test_debug_snapshot_lists_state() {
        let (store, workflow, instance) = fixtures();

        let mut first = session_at(&store, &workflow, &instance, "project_select").await;
        first.metadata().insert("project_id", json!(5)).await.unwrap();
        first
            .tables()
            .insert(
                "library_table",
                TableSnapshot::from_columns(vec![Column::int64("id", vec![Some(1)])]).unwrap(),
            )
            .await
            .unwrap();

        let mut second = session_at(&store, &workflow, &instance, "sample_annotation").await;
        let snapshot = second.debug_snapshot().await.unwrap();

        assert_eq!(snapshot.current_step, "sample_annotation");
        assert_eq!(snapshot.steps, ["project_select", "sample_annotation"]);
        assert_eq!(snapshot.tables, ["library_table"]);
        assert!(snapshot.metadata_fields.contains(&"project_id".to_string()));

        let rendered = snapshot.to_string();
        assert!(rendered.contains("project_select -> sample_annotation"));
    }

    #[tokio::test]
    async fn test_header_and_metadata_are_independent_slots() {
        let (store, workflow, instance) = fixtures();

        let mut session = session_at(&store, &workflow, &instance, "project_select").await;
        session.metadata().insert("k", json!(1)).await.unwrap();
        session.header().insert("k", json!(2)).await.unwrap();

        let mut fresh = session_at(&store, &workflow, &instance, "project_select").await;
        assert_eq!(fresh.metadata().get("k").await.unwrap(), Some(json!(1)));
        assert_eq!(fresh.header().get("k").await.unwrap(), Some(json!(2)));
    }
}
