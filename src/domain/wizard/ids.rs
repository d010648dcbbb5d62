//! Validated identifiers for the wizard keyspace

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Maximum length for workflow names and instance ids
pub const MAX_ID_LENGTH: usize = 64;

/// Names become cache-key segments, so the separator (`:`) and the glob
/// wildcard (`*`) are excluded outright.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").unwrap());

/// Validated workflow name, the first segment of every instance key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkflowName(String);

impl WorkflowName {
    /// Create a new validated workflow name
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        validate_name("workflow name", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WorkflowName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkflowName> for String {
    fn from(name: WorkflowName) -> Self {
        name.0
    }
}

impl fmt::Display for WorkflowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for WorkflowName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of one in-flight wizard run
///
/// Freshly generated ids are UUID v7: globally unique and roughly
/// time-ordered, so concurrent instances sort by creation time in key
/// listings. Externally supplied ids only need to be valid key segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    /// Create a validated instance id from an existing token
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_name("instance id", &id)?;
        Ok(Self(id))
    }

    /// Generate a fresh time-ordered instance id
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InstanceId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a name used as a cache-key segment
pub fn validate_name(label: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", label)));
    }

    if value.len() > MAX_ID_LENGTH {
        return Err(DomainError::validation(format!(
            "{} exceeds maximum length of {} characters",
            label, MAX_ID_LENGTH
        )));
    }

    if !NAME_PATTERN.is_match(value) {
        return Err(DomainError::validation(format!(
            "Invalid {} '{}': must be alphanumeric with hyphens or underscores",
            label, value
        )));
    }

    Ok(())
}
