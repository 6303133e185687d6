//! # disaster-etl - labelled message table builder
//!
//! Reads a messages CSV and a categories CSV whose rows carry strings such as
//! `related-1;request-0;offer-0`, turns every category into an integer
//! column, drops duplicate rows and writes the result to SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │ messages.csv│────▶│   Parser    │────▶│    Transform     │────▶│   SQLite    │
//! │ categories  │     │ (auto-enc)  │     │ schema → labels  │     │ (replace)   │
//! └─────────────┘     └─────────────┘     │ → join → dedupe  │     └─────────────┘
//!                                         └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use disaster_etl::{run_etl, EtlConfig};
//!
//! let report = run_etl(&EtlConfig::new("messages.csv", "categories.csv")).unwrap();
//! println!("{} rows in {}", report.rows_written, report.table_name);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Cells, relations, category schema
//! - [`parser`] - CSV extraction with auto-detection
//! - [`transform`] - Schema, labels, join, dedupe and pipeline
//! - [`store`] - SQLite load
//! - [`logs`] - Run log

// Core modules
pub mod error;
pub mod models;

// Logging
pub mod logs;

// Extraction
pub mod parser;

// Transformation
pub mod transform;

// Load
pub mod store;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, StoreError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CategorySchema, Cell, ColumnType, LabelVector, Relation};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    csv_to_relation,
    parse_bytes,
    parse_csv,
    parse_csv_file,
    parse_csv_file_auto,
    detect_encoding,
    detect_delimiter,
    decode_content,
    ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    build_relation,
    dedupe,
    derive_schema,
    extract_labels,
    transform,
    extract_and_transform,
    run_etl,
    EtlConfig,
    EtlReport,
    JoinStrategy,
    RowCountPolicy,
    TransformOptions,
    TransformOutput,
    DEFAULT_DATABASE_PATH,
    DEFAULT_TABLE_NAME,
};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::SqliteStore;
