//! Error types for the disaster-etl pipeline.
//!
//! One enum per stage, wrapped by a top-level error:
//!
//! - [`CsvError`] - Extraction (reading and decoding input files)
//! - [`TransformError`] - Schema derivation, label decoding, joining
//! - [`StoreError`] - Persisting the output table
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Extraction Errors
// =============================================================================

/// Errors while reading an input file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised by the transform core.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The encoded categories string used for the schema is malformed.
    #[error("Malformed categories string: {0}")]
    Format(String),

    /// A token's trailing character is not a digit.
    #[error("Row {row}: cannot parse label from token '{token}' ({message})")]
    LabelParse {
        row: usize,
        token: String,
        message: String,
    },

    /// A decoded label vector disagrees with the schema width.
    #[error("Row {row}: expected {expected} category labels, found {found}")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Messages and categories differ in row count under the strict policy.
    #[error("Row count mismatch: {messages} messages vs {categories} category rows")]
    RowCountMismatch { messages: usize, categories: usize },

    /// Missing required column.
    #[error("Missing column '{column}' in {relation}")]
    MissingColumn { relation: String, column: String },

    /// A category name clashes with an existing message column.
    #[error("Column '{0}' appears in both messages and categories")]
    DuplicateColumn(String),

    /// The identifier occurs more than once in the categories relation.
    #[error("Identifier {0} appears more than once in categories")]
    DuplicateKey(String),

    /// A message has no categories row with the same identifier.
    #[error("Message row {row} (id {key}) has no matching categories row")]
    UnmatchedKey { row: usize, key: String },
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors while persisting the output relation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite failure (open, DDL, insert, commit).
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The target table name cannot be used.
    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    /// A stored row does not fit the table's columns.
    #[error("Malformed stored row: {0}")]
    RowShape(#[from] crate::models::RowWidthError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run_etl`].
/// Each stage keeps its own variant so callers can report causes distinctly.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extraction error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Persistence error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// JSON serialization of the output relation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // TransformError -> PipelineError
        let transform_err = TransformError::MissingColumn {
            relation: "categories".into(),
            column: "categories".into(),
        };
        let pipeline_err: PipelineError = transform_err.into();
        assert!(matches!(pipeline_err, PipelineError::Transform(_)));
        assert!(pipeline_err.to_string().contains("Missing column"));
    }

    #[test]
    fn test_schema_mismatch_names_row() {
        let err = TransformError::SchemaMismatch {
            row: 7,
            expected: 3,
            found: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 7"));
        assert!(msg.contains("expected 3"));
        assert!(msg.contains("found 2"));
    }

    #[test]
    fn test_store_error_is_distinct() {
        let err: PipelineError = StoreError::InvalidTableName(String::new()).into();
        assert!(matches!(err, PipelineError::Store(_)));
    }
}
