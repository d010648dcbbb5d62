//! Wizard store
//!
//! A resumable multi-step form ("wizard") persists heterogeneous
//! intermediate state across HTTP round-trips: the ordered trail of visited
//! steps, free-form records, and tabular datasets, all keyed by one
//! in-flight workflow instance. This crate is that store:
//! - step tracking with undo that purges the undone step's writes,
//! - step-scoped record and table stores with backward resolution
//!   (unmodified data is inherited from the nearest earlier step),
//! - write-fork semantics (writes land on the current step only),
//! - a Redis/in-memory cache backend behind one injected trait.
//!
//! Which step comes next is the caller's business; the data-driven
//! [`domain::wizard::TransitionTable`] is the seam for that decision.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    CacheStore, CacheStoreExt, Column, ColumnValues, Comment, DomainError, InstanceId, Record,
    RecordStore, Slot, StepTracker, TableSnapshot, TableStore, TransitionTable, WizardError,
    WizardSession, WorkflowName,
};
pub use infrastructure::{
    CacheBackendConfig, CacheBackendFactory, InMemoryStore, RedisStore, RedisStoreConfig,
};
