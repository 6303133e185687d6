//! Domain models for the disaster-etl pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Cell`] - A single typed value (null, integer or text)
//! - [`Relation`] - An ordered table of uniformly-shaped rows
//! - [`ColumnType`] - Storage affinity of a column
//! - [`CategorySchema`] - Ordered category names shared by every row
//! - [`LabelVector`] - Decoded labels for one categories row

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Cell
// =============================================================================

/// A single value in a [`Relation`].
///
/// Equality is exact, which is what row deduplication relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Missing value (empty CSV field).
    Null,
    /// Whole number.
    Integer(i64),
    /// Anything else.
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

// =============================================================================
// Column Type
// =============================================================================

/// Storage affinity of a column, inferred from its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    /// SQL type name used when creating tables.
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }
}

// =============================================================================
// Relation
// =============================================================================

/// An ordered sequence of rows sharing one ordered set of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// A row was pushed whose width differs from the column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWidthError {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for RowWidthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row has {} cells, relation has {} columns", self.found, self.expected)
    }
}

impl std::error::Error for RowWidthError {}

impl Relation {
    /// Create an empty relation with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must be exactly as wide as the relation.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), RowWidthError> {
        if row.len() != self.columns.len() {
            return Err(RowWidthError {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Keep only the rows for which `keep` returns true, in order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Cell]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column name), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Infer the affinity of a column: integer when every non-null cell is an
    /// integer (an all-null column counts as integer), text otherwise.
    pub fn column_type(&self, index: usize) -> ColumnType {
        let all_integer = self
            .rows
            .iter()
            .map(|r| &r[index])
            .all(|c| matches!(c, Cell::Null | Cell::Integer(_)));
        if all_integer {
            ColumnType::Integer
        } else {
            ColumnType::Text
        }
    }

    /// Build a relation from parts, checking every row width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, RowWidthError> {
        let mut relation = Relation::new(columns);
        for row in rows {
            relation.push_row(row)?;
        }
        Ok(relation)
    }
}

// =============================================================================
// Category Schema
// =============================================================================

/// Ordered list of category names shared by every encoded categories string.
///
/// Derived once by [`crate::transform::schema::derive_schema`] and passed
/// explicitly into the relation builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySchema {
    names: Vec<String>,
}

impl CategorySchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Encode labels back into `name-digit;name-digit;...`.
    ///
    /// Returns `None` when the vector does not match the schema width or a
    /// label would not fit in a single trailing digit.
    pub fn encode(&self, labels: &LabelVector) -> Option<String> {
        if labels.len() != self.names.len() {
            return None;
        }
        let mut tokens = Vec::with_capacity(self.names.len());
        for (name, label) in self.names.iter().zip(labels.iter()) {
            if !(0..=9).contains(label) {
                return None;
            }
            tokens.push(format!("{}-{}", name, label));
        }
        Some(tokens.join(";"))
    }
}

// =============================================================================
// Label Vector
// =============================================================================

/// Decoded labels for one categories row, in token order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelVector(pub Vec<i64>);

impl LabelVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, i64> {
        self.0.iter()
    }
}

impl From<Vec<i64>> for LabelVector {
    fn from(v: Vec<i64>) -> Self {
        LabelVector(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut rel = Relation::new(["id", "message"]);
        assert!(rel.push_row(vec![Cell::Integer(1), "hi".into()]).is_ok());

        let err = rel.push_row(vec![Cell::Integer(2)]).unwrap_err();
        assert_eq!(err, RowWidthError { expected: 2, found: 1 });
        assert_eq!(rel.row_count(), 1);
    }

    #[test]
    fn test_column_type_inference() {
        let rel = Relation::from_rows(
            vec!["id".into(), "message".into(), "original".into()],
            vec![
                vec![Cell::Integer(1), "Water".into(), Cell::Null],
                vec![Cell::Integer(2), "Food".into(), Cell::Null],
            ],
        )
        .unwrap();

        assert_eq!(rel.column_type(0), ColumnType::Integer);
        assert_eq!(rel.column_type(1), ColumnType::Text);
        assert_eq!(rel.column_type(2), ColumnType::Integer);
    }

    #[test]
    fn test_get_by_column_name() {
        let rel = Relation::from_rows(
            vec!["id".into(), "message".into()],
            vec![vec![Cell::Integer(1), "Water needed".into()]],
        )
        .unwrap();

        assert_eq!(rel.get(0, "message"), Some(&Cell::from("Water needed")));
        assert_eq!(rel.get(0, "genre"), None);
        assert_eq!(rel.get(1, "id"), None);
    }

    #[test]
    fn test_schema_encode() {
        let schema = CategorySchema::new(vec!["related".into(), "request".into()]);
        let encoded = schema.encode(&LabelVector(vec![1, 0]));
        assert_eq!(encoded.as_deref(), Some("related-1;request-0"));

        assert!(schema.encode(&LabelVector(vec![1])).is_none());
        assert!(schema.encode(&LabelVector(vec![1, 12])).is_none());
    }

    #[test]
    fn test_cell_serializes_untagged() {
        let row = vec![Cell::Integer(3), Cell::from("x"), Cell::Null];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[3,"x",null]"#);
    }
}
