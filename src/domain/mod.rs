//! Domain layer - core semantics and the cache abstraction

pub mod cache;
pub mod codec;
pub mod error;
pub mod wizard;

pub use cache::{CacheStore, CacheStoreExt};
pub use codec::{Column, ColumnValues, Record, TableSnapshot};
pub use error::DomainError;
pub use wizard::{
    pop_last_step, Comment, DebugSnapshot, InstanceId, KeyBuilder, RecordStore, Slot, StepTracker,
    TableStore, Transition, TransitionContext, TransitionTable, WizardError, WizardSession,
    WorkflowName,
};
