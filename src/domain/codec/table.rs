//! Tabular snapshot codec (columnar binary)

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Cell values for one column, one variant per supported primitive type
///
/// `None` cells are null markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValues {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
    Bool(Vec<Option<bool>>),
}

impl ColumnValues {
    /// Number of cells in the column
    pub fn len(&self) -> usize {
        match self {
            Self::Int64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Utf8(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a string column from arbitrary JSON values
    ///
    /// Mixed-typed source columns have no exact columnar representation, so
    /// every non-null cell is rendered to its compact JSON text. This is
    /// lossy: `1` and `"1"` become indistinguishable. Null stays null.
    pub fn utf8_from_json(values: &[Value]) -> Self {
        let cells = values
            .iter()
            .map(|value| match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect();

        Self::Utf8(cells)
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn int64(name: impl Into<String>, cells: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnValues::Int64(cells))
    }

    pub fn float64(name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnValues::Float64(cells))
    }

    pub fn utf8(name: impl Into<String>, cells: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnValues::Utf8(cells))
    }

    pub fn bool(name: impl Into<String>, cells: Vec<Option<bool>>) -> Self {
        Self::new(name, ColumnValues::Bool(cells))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered collection of equally-sized typed columns
///
/// Column order and names are preserved through the wire format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSnapshot {
    columns: Vec<Column>,
}

impl TableSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from columns, validating shape
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DomainError> {
        let mut snapshot = Self::new();

        for column in columns {
            snapshot.push_column(column)?;
        }

        Ok(snapshot)
    }

    /// Appends a column; its length must match existing columns and its name
    /// must be unique within the snapshot
    pub fn push_column(&mut self, column: Column) -> Result<(), DomainError> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(DomainError::validation(format!(
                "Duplicate column name '{}'",
                column.name
            )));
        }

        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(DomainError::validation(format!(
                    "Column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    first.len()
                )));
            }
        }

        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }
}

/// Serializes a snapshot to its columnar binary wire form
pub fn encode_table(table: &TableSnapshot) -> Result<Bytes, DomainError> {
    let data = bincode::serialize(table)
        .map_err(|e| DomainError::codec(format!("Failed to encode table: {}", e)))?;

    Ok(Bytes::from(data))
}

/// Deserializes a snapshot from its wire form
///
/// Malformed or version-incompatible bytes surface as a codec error.
pub fn decode_table(bytes: &[u8]) -> Result<TableSnapshot, DomainError> {
    bincode::deserialize(bytes)
        .map_err(|e| DomainError::codec(format!("Failed to decode table: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> TableSnapshot {
        TableSnapshot::from_columns(vec![
            Column::int64("id", vec![Some(1), Some(2), None]),
            Column::float64("concentration", vec![Some(1.5), None, Some(0.25)]),
            Column::utf8(
                "name",
                vec![Some("lib-a".to_string()), Some("lib-b".to_string()), None],
            ),
            Column::bool("qc_passed", vec![Some(true), Some(false), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_round_trip() {
        let table = sample_table();

        let bytes = encode_table(&table).unwrap();
        let decoded = decode_table(&bytes).unwrap();

        assert_eq!(decoded, table);
        assert_eq!(
            decoded.column_names(),
            vec!["id", "concentration", "name", "qc_passed"]
        );
        assert_eq!(decoded.num_rows(), 3);
    }

    #[test]
    fn test_empty_table_round_trip() {
        let table = TableSnapshot::new();

        let bytes = encode_table(&table).unwrap();
        let decoded = decode_table(&bytes).unwrap();

        assert_eq!(decoded.num_columns(), 0);
        assert_eq!(decoded.num_rows(), 0);
    }

    #[test]
    fn test_decode_table_malformed() {
        let result = decode_table(&[0xff, 0x01, 0x02]);
        assert!(matches!(result, Err(DomainError::Codec { .. })));
    }

    #[test]
    fn test_push_column_rejects_ragged_rows() {
        let mut table = TableSnapshot::new();
        table
            .push_column(Column::int64("id", vec![Some(1), Some(2)]))
            .unwrap();

        let result = table.push_column(Column::utf8("name", vec![Some("x".to_string())]));
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_push_column_rejects_duplicate_name() {
        let mut table = TableSnapshot::new();
        table.push_column(Column::int64("id", vec![Some(1)])).unwrap();

        let result = table.push_column(Column::int64("id", vec![Some(2)]));
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_utf8_from_json_coerces_mixed_cells() {
        let values = vec![json!("plain"), json!(7), json!(true), json!(null)];

        let column = Column::new("mixed", ColumnValues::utf8_from_json(&values));

        assert_eq!(
            column.values(),
            &ColumnValues::Utf8(vec![
                Some("plain".to_string()),
                Some("7".to_string()),
                Some("true".to_string()),
                None,
            ])
        );
    }

    #[test]
    fn test_column_lookup_by_name() {
        let table = sample_table();

        assert!(table.column("qc_passed").is_some());
        assert!(table.column("missing").is_none());
    }
}
