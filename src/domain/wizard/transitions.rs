//! Data-driven step transitions
//!
//! The store never decides which step comes next; the surrounding
//! application does. This module gives that decision an inspectable shape: a
//! flat table of `(from, guard) -> to` entries evaluated against the
//! accumulated wizard state, instead of branching on concrete step types.

use std::fmt;

use serde_json::Value;

use crate::domain::codec::Record;

/// Read-only view of the accumulated state a guard may inspect
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    metadata: &'a Record,
    table_names: &'a [String],
}

impl<'a> TransitionContext<'a> {
    pub fn new(metadata: &'a Record, table_names: &'a [String]) -> Self {
        Self {
            metadata,
            table_names,
        }
    }

    pub fn metadata(&self) -> &Record {
        self.metadata
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.metadata.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table_names.iter().any(|t| t == name)
    }
}

type Guard = Box<dyn Fn(&TransitionContext) -> bool + Send + Sync>;

/// One edge of the workflow graph
pub struct Transition {
    from: String,
    to: String,
    guard: Guard,
}

impl Transition {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        guard: impl Fn(&TransitionContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            guard: Box::new(guard),
        }
    }

    /// An edge that always fires; place it after guarded edges from the same
    /// step to act as the fallback branch
    pub fn unconditional(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, |_| true)
    }

    pub fn from_step(&self) -> &str {
        &self.from
    }

    pub fn to_step(&self) -> &str {
        &self.to
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// The workflow graph as plain data
///
/// Entries are evaluated in insertion order; the first edge leaving the
/// current step whose guard passes wins.
#[derive(Debug, Default)]
pub struct TransitionTable {
    transitions: Vec<Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Every step name appearing in the table, sources and targets alike
    pub fn steps(&self) -> Vec<&str> {
        let mut steps: Vec<&str> = self
            .transitions
            .iter()
            .flat_map(|t| [t.from_step(), t.to_step()])
            .collect();

        steps.sort();
        steps.dedup();
        steps
    }

    /// The next step tag for the current step, or `None` when no edge fires
    /// (the current step is terminal for this state)
    pub fn next_step(&self, current: &str, ctx: &TransitionContext) -> Option<&str> {
        self.transitions
            .iter()
            .find(|t| t.from == current && (t.guard)(ctx))
            .map(|t| t.to.as_str())
    }
}
