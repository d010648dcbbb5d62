//! Step tracker - the ordered, duplicate-free trail of visited steps

use std::sync::Arc;

use crate::domain::cache::{CacheStore, CacheStoreExt};
use crate::domain::DomainError;

use super::ids::{InstanceId, WorkflowName};
use super::keys::KeyBuilder;

/// Owns the step list of one wizard instance
///
/// The list is both audit trail and resolution order: scoped reads walk it
/// from the most recently appended entry backward. It is fetched lazily on
/// first access and then served from memory for the tracker's lifetime;
/// mutations persist the full list back as one overwrite (the backend has no
/// list-append primitive).
#[derive(Debug)]
pub struct StepTracker {
    store: Arc<dyn CacheStore>,
    key: String,
    steps: Option<Vec<String>>,
}

impl StepTracker {
    pub fn new(store: Arc<dyn CacheStore>, keys: &KeyBuilder) -> Self {
        Self {
            store,
            key: keys.steps(),
            steps: None,
        }
    }

    async fn load(&mut self) -> Result<&mut Vec<String>, DomainError> {
        if self.steps.is_none() {
            let steps = self.store.get_string_list(&self.key).await?;
            self.steps = Some(steps);
        }

        Ok(self.steps.as_mut().expect("loaded above"))
    }

    /// The visited steps, oldest first
    pub async fn steps(&mut self) -> Result<&[String], DomainError> {
        Ok(self.load().await?.as_slice())
    }

    /// Appends a step, unless it already appears anywhere in the list
    ///
    /// Returns whether the list changed.
    pub async fn add(&mut self, step: &str) -> Result<bool, DomainError> {
        let steps = self.load().await?;

        if steps.iter().any(|s| s == step) {
            return Ok(false);
        }

        steps.push(step.to_string());
        let snapshot = steps.clone();
        self.store.set_string_list(&self.key, &snapshot).await?;

        tracing::debug!(step, total = snapshot.len(), "Registered wizard step");
        Ok(true)
    }

    /// Removes and returns the most recent step, `None` when the list is
    /// empty
    pub async fn pop_last(&mut self) -> Result<Option<String>, DomainError> {
        let steps = self.load().await?;

        let Some(popped) = steps.pop() else {
            return Ok(None);
        };

        let snapshot = steps.clone();
        self.store.set_string_list(&self.key, &snapshot).await?;

        Ok(Some(popped))
    }

    /// The most recent step without mutation, `None` when the list is empty
    pub async fn peek_last(&mut self) -> Result<Option<String>, DomainError> {
        Ok(self.load().await?.last().cloned())
    }
}

/// Undoes the most recent step of an instance
///
/// Pops the last step from the trail and purges every key that step had
/// written, so a later re-`add` of the same name starts clean instead of
/// resurrecting stale records and tables. Returns the new last step, which
/// is the step the caller should re-render, or `None` when the trail is (or
/// becomes) empty.
pub async fn pop_last_step(
    store: Arc<dyn CacheStore>,
    workflow: &WorkflowName,
    instance: &InstanceId,
) -> Result<Option<String>, DomainError> {
    let keys = KeyBuilder::new(workflow, instance);
    let mut tracker = StepTracker::new(store.clone(), &keys);

    let Some(popped) = tracker.pop_last().await? else {
        return Ok(None);
    };

    let removed = store.delete_by_prefix(&keys.step_pattern(&popped)).await?;
    tracing::debug!(
        workflow = %workflow,
        instance = %instance,
        step = %popped,
        keys_removed = removed,
        "Undid wizard step"
    );

    tracker.peek_last().await
}
