//! High-level pipeline API: extract, transform, load.
//!
//! [`transform`] is the in-memory core. [`run_etl`] wraps it with file
//! extraction and SQLite persistence.
//!
//! # Example
//!
//! ```rust,ignore
//! use disaster_etl::{run_etl, EtlConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EtlConfig::new("messages.csv", "categories.csv");
//!     let report = run_etl(&config)?;
//!     println!("Wrote {} rows", report.rows_written);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineResult, TransformResult};
use crate::logs::{log_info, log_info_indent, log_success};
use crate::models::{CategorySchema, Relation};
use crate::parser::{parse_csv_file, ParseResult};
use crate::store::SqliteStore;

use super::builder::{build_relation, JoinStrategy, RowCountPolicy};
use super::dedupe::dedupe;
use super::schema::derive_schema;

/// Database file used when none is given.
pub const DEFAULT_DATABASE_PATH: &str = "Disaster_Response.db";

/// Output table used when none is given.
pub const DEFAULT_TABLE_NAME: &str = "labelled_messages";

/// Options for the transform core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Identifier column, present in both inputs (used by `JoinStrategy::ById`)
    pub id_column: String,

    /// Column holding the encoded categories string
    pub categories_column: String,

    /// How categories rows are matched to messages
    pub join: JoinStrategy,

    /// What positional alignment does on a row-count mismatch
    pub row_count_policy: RowCountPolicy,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            categories_column: "categories".to_string(),
            join: JoinStrategy::Positional,
            row_count_policy: RowCountPolicy::Truncate,
        }
    }
}

/// Result of the transform core
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutput {
    /// Category names, in column order
    pub schema: CategorySchema,

    /// Deduplicated wide relation
    pub relation: Relation,

    /// Rows in the wide relation before deduplication
    pub rows_before_dedupe: usize,

    /// Rows removed as exact duplicates
    pub duplicates_removed: usize,
}

/// Turn messages and categories into the deduplicated wide relation.
///
/// Stages run in order: schema derivation, per-row decoding and join,
/// deduplication. The first failure is returned as-is.
pub fn transform(
    messages: &Relation,
    categories: &Relation,
    options: &TransformOptions,
) -> TransformResult<TransformOutput> {
    let schema = derive_schema(categories, &options.categories_column)?;
    log_success(format!("{} categories found", schema.len()));

    let wide = build_relation(messages, categories, &schema, options)?;
    let rows_before_dedupe = wide.row_count();
    log_success(format!(
        "Built {} rows x {} columns",
        rows_before_dedupe,
        wide.column_count()
    ));

    let relation = dedupe(wide);
    let duplicates_removed = rows_before_dedupe - relation.row_count();
    if duplicates_removed > 0 {
        log_info(format!("Removed {} duplicate rows", duplicates_removed));
    }

    Ok(TransformOutput {
        schema,
        relation,
        rows_before_dedupe,
        duplicates_removed,
    })
}

/// Configuration for one ETL run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Messages CSV
    pub messages_path: PathBuf,

    /// Categories CSV
    pub categories_path: PathBuf,

    /// SQLite database file (created if missing)
    pub database_path: PathBuf,

    /// Table to replace with the result
    pub table_name: String,

    /// CSV delimiter (auto-detect if not specified)
    pub delimiter: Option<char>,

    /// Transform core options
    pub options: TransformOptions,
}

impl EtlConfig {
    /// Config with default database, table and options.
    pub fn new(messages_path: impl Into<PathBuf>, categories_path: impl Into<PathBuf>) -> Self {
        Self {
            messages_path: messages_path.into(),
            categories_path: categories_path.into(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            delimiter: None,
            options: TransformOptions::default(),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct EtlReport {
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub categories: usize,
    pub duplicates_removed: usize,
    pub database_path: PathBuf,
    pub table_name: String,
}

/// Read both inputs and run the transform core, without touching the store.
pub fn extract_and_transform(config: &EtlConfig) -> PipelineResult<TransformOutput> {
    let messages = extract(&config.messages_path, config.delimiter)?;
    let categories = extract(&config.categories_path, config.delimiter)?;
    log_success("Extracted data");

    log_info("⚙️  Transforming...");
    let output = transform(&messages.relation, &categories.relation, &config.options)?;
    log_success("Transformed data");

    Ok(output)
}

/// Extract, transform and load: the whole batch job.
///
/// The target table is replaced only after the transform succeeded, so a
/// failing run leaves the database untouched.
pub fn run_etl(config: &EtlConfig) -> PipelineResult<EtlReport> {
    let output = extract_and_transform(config)?;

    log_info(format!("💾 Loading into {}", config.database_path.display()));
    let mut store = SqliteStore::open(&config.database_path)?;
    let rows_written = store.replace_table(&config.table_name, &output.relation)?;
    log_success(format!(
        "Saved {} rows in \"{}\" as table \"{}\"",
        rows_written,
        config.database_path.display(),
        config.table_name
    ));

    Ok(EtlReport {
        rows_written,
        columns: output.relation.columns().to_vec(),
        categories: output.schema.len(),
        duplicates_removed: output.duplicates_removed,
        database_path: config.database_path.clone(),
        table_name: config.table_name.clone(),
    })
}

fn extract(path: &Path, delimiter: Option<char>) -> PipelineResult<ParseResult> {
    log_info(format!("📖 Reading {}", path.display()));
    let parsed = parse_csv_file(path, delimiter)?;
    log_info_indent(
        format!(
            "encoding {}, delimiter '{}', {} rows, columns: {}",
            parsed.encoding,
            format_delimiter(parsed.delimiter),
            parsed.relation.row_count(),
            parsed.headers().join(", ")
        ),
        1,
    );
    Ok(parsed)
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
