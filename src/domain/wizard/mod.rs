//! Wizard domain - resumable multi-step form state
//!
//! One wizard instance is a namespace of cache keys holding:
//! - the ordered trail of visited steps,
//! - per-step record slots ("metadata", "header"),
//! - per-step named tables.
//!
//! Reads resolve backward through the trail so unmodified data is inherited
//! from earlier steps; writes fork onto the current step; undoing a step
//! purges everything it wrote.

mod error;
mod ids;
mod keys;
mod layered;
mod record_store;
mod session;
mod step_list;
mod table_store;
mod transitions;

pub use error::WizardError;
pub use ids::{validate_name, InstanceId, WorkflowName, MAX_ID_LENGTH};
pub use keys::{KeyBuilder, Slot};
pub use layered::resolve_layered;
pub use record_store::RecordStore;
pub use session::{Comment, DebugSnapshot, WizardSession, COMMENTS_FIELD};
pub use step_list::{pop_last_step, StepTracker};
pub use table_store::TableStore;
pub use transitions::{Transition, TransitionContext, TransitionTable};
