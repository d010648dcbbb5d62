//! Wizard error types

use thiserror::Error;

use crate::domain::DomainError;

/// Errors surfaced by the wizard stores and session
#[derive(Debug, Error)]
pub enum WizardError {
    /// No step in the instance ever wrote the requested table. Unlike record
    /// slots, tables do not default to empty; callers branch on this
    /// explicitly and substitute their own default dataset.
    #[error("Table not found: {table}")]
    TableNotFound { table: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl WizardError {
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }
}
