//! Canonical cache-key construction for one wizard instance
//!
//! Every key under an instance is produced here, so the record store, table
//! store and step tracker can never drift apart on key shape. Layout:
//!
//! - step list:   `{workflow}:{instance}:steps`
//! - record slot: `{workflow}:{instance}:{step}:{slot}`
//! - table:       `{workflow}:{instance}:{step}:tables:{table}`

use std::fmt;

use super::ids::{InstanceId, WorkflowName};

/// Marker segment separating table keys from record-slot keys
const TABLES_SEGMENT: &str = "tables";

/// Named logical record within a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Metadata,
    Header,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Metadata => "metadata",
            Slot::Header => "header",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds canonical keys and glob patterns for one `(workflow, instance)`
/// namespace
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    workflow: String,
    instance: String,
}

impl KeyBuilder {
    pub fn new(workflow: &WorkflowName, instance: &InstanceId) -> Self {
        Self {
            workflow: workflow.as_str().to_string(),
            instance: instance.as_str().to_string(),
        }
    }

    /// Key holding the ordered step list
    pub fn steps(&self) -> String {
        format!("{}:{}:steps", self.workflow, self.instance)
    }

    /// Key for one record slot of one step
    pub fn record(&self, step: &str, slot: Slot) -> String {
        format!("{}:{}:{}:{}", self.workflow, self.instance, step, slot.as_str())
    }

    /// Key for one named table of one step
    pub fn table(&self, step: &str, table: &str) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.workflow, self.instance, step, TABLES_SEGMENT, table
        )
    }

    /// Pattern matching every key a step has written
    pub fn step_pattern(&self, step: &str) -> String {
        format!("{}:{}:{}:*", self.workflow, self.instance, step)
    }

    /// Pattern matching every key of the instance
    pub fn instance_pattern(&self) -> String {
        format!("{}:{}:*", self.workflow, self.instance)
    }

    /// Pattern matching every table key of the instance, across all steps
    pub fn table_scan_pattern(&self) -> String {
        format!("{}:{}:*:{}:*", self.workflow, self.instance, TABLES_SEGMENT)
    }

    /// Extracts the table name from a key produced by [`KeyBuilder::table`]
    pub fn table_name_from_key(key: &str) -> Option<&str> {
        let marker = format!(":{}:", TABLES_SEGMENT);
        let start = key.rfind(&marker)? + marker.len();
        let name = &key[start..];

        (!name.is_empty()).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> KeyBuilder {
        let workflow = WorkflowName::new("library_annotation").unwrap();
        let instance = InstanceId::new("u1").unwrap();
        KeyBuilder::new(&workflow, &instance)
    }

    #[test]
    fn test_steps_key() {
        assert_eq!(builder().steps(), "library_annotation:u1:steps");
    }

    #[test]
    fn test_record_key() {
        assert_eq!(
            builder().record("project_select", Slot::Metadata),
            "library_annotation:u1:project_select:metadata"
        );
        assert_eq!(
            builder().record("project_select", Slot::Header),
            "library_annotation:u1:project_select:header"
        );
    }

    #[test]
    fn test_table_key() {
        assert_eq!(
            builder().table("sample_annotation", "barcode_table"),
            "library_annotation:u1:sample_annotation:tables:barcode_table"
        );
    }

    #[test]
    fn test_patterns() {
        let keys = builder();

        assert_eq!(keys.instance_pattern(), "library_annotation:u1:*");
        assert_eq!(
            keys.step_pattern("sample_annotation"),
            "library_annotation:u1:sample_annotation:*"
        );
        assert_eq!(
            keys.table_scan_pattern(),
            "library_annotation:u1:*:tables:*"
        );
    }

    #[test]
    fn test_table_name_from_key() {
        let key = builder().table("s1", "library_table");

        assert_eq!(KeyBuilder::table_name_from_key(&key), Some("library_table"));
        assert_eq!(
            KeyBuilder::table_name_from_key("library_annotation:u1:s1:metadata"),
            None
        );
    }

    #[test]
    fn test_step_pattern_does_not_cover_steps_key() {
        let keys = builder();

        // The step-list key must survive a per-step purge even for a step
        // that happens to be named "steps".
        assert_ne!(keys.step_pattern("steps"), keys.steps());
        assert!(!keys.steps().starts_with(&keys.step_pattern("steps").replace('*', "")));
    }
}
