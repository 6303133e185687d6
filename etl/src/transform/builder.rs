//! Wide relation assembly.
//!
//! Decodes every categories row against the schema and appends one label
//! column per category to the messages relation.
//!
//! # Alignment
//!
//! ```text
//! Positional (default)                 ById
//! ┌──────────────┐ ┌──────────────┐    ┌──────────────┐ ┌──────────────┐
//! │ msg row 0    │─│ cat row 0    │    │ msg id 7     │─│ cat id 7     │
//! │ msg row 1    │─│ cat row 1    │    │ msg id 3     │─│ cat id 3     │
//! └──────────────┘ └──────────────┘    └──────────────┘ └──────────────┘
//! ```
//!
//! Positional alignment ignores identifiers entirely: row j of the labels
//! belongs to row j of the messages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{TransformError, TransformResult};
use crate::logs::log_warning;
use crate::models::{CategorySchema, Cell, LabelVector, Relation};

use super::labels::extract_labels;
use super::pipeline::TransformOptions;

/// How categories rows are matched to messages rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategy {
    /// Match by row index.
    #[default]
    Positional,
    /// Match by the identifier column; every message needs exactly one
    /// categories row.
    ById,
}

/// What positional alignment does when the two relations differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCountPolicy {
    /// Warn and keep only as many rows as the shorter relation has.
    #[default]
    Truncate,
    /// Fail with [`TransformError::RowCountMismatch`].
    Strict,
}

/// Build the wide relation: messages columns followed by one column per
/// schema entry.
pub fn build_relation(
    messages: &Relation,
    categories: &Relation,
    schema: &CategorySchema,
    options: &TransformOptions,
) -> TransformResult<Relation> {
    let labels = decode_all(categories, schema, &options.categories_column)?;

    for name in schema.names() {
        if messages.column_index(name).is_some() {
            return Err(TransformError::DuplicateColumn(name.clone()));
        }
    }

    let pairs = match options.join {
        JoinStrategy::Positional => align_by_position(messages, categories, options.row_count_policy)?,
        JoinStrategy::ById => align_by_id(messages, categories, &options.id_column)?,
    };

    let columns: Vec<String> = messages
        .columns()
        .iter()
        .chain(schema.names())
        .cloned()
        .collect();

    let mut wide = Relation::new(columns);
    for (msg_idx, cat_idx) in pairs {
        let mut row = messages.rows()[msg_idx].clone();
        row.extend(labels[cat_idx].iter().copied().map(Cell::Integer));
        wide.push_row(row).map_err(|e| TransformError::SchemaMismatch {
            row: cat_idx,
            expected: e.expected,
            found: e.found,
        })?;
    }

    Ok(wide)
}

/// Decode every categories row, in order, rejecting any whose width differs
/// from the schema.
pub fn decode_all(
    categories: &Relation,
    schema: &CategorySchema,
    column: &str,
) -> TransformResult<Vec<LabelVector>> {
    let idx = categories
        .column_index(column)
        .ok_or_else(|| TransformError::MissingColumn {
            relation: "categories".to_string(),
            column: column.to_string(),
        })?;

    categories
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let labels = match &cells[idx] {
                Cell::Text(encoded) => extract_labels(encoded, row)?,
                other => {
                    return Err(TransformError::LabelParse {
                        row,
                        token: other.to_string(),
                        message: "not an encoded categories string".to_string(),
                    })
                }
            };
            if labels.len() != schema.len() {
                return Err(TransformError::SchemaMismatch {
                    row,
                    expected: schema.len(),
                    found: labels.len(),
                });
            }
            Ok(labels)
        })
        .collect()
}

fn align_by_position(
    messages: &Relation,
    categories: &Relation,
    policy: RowCountPolicy,
) -> TransformResult<Vec<(usize, usize)>> {
    let (m, c) = (messages.row_count(), categories.row_count());
    if m != c {
        match policy {
            RowCountPolicy::Strict => {
                return Err(TransformError::RowCountMismatch {
                    messages: m,
                    categories: c,
                })
            }
            RowCountPolicy::Truncate => log_warning(format!(
                "Row count mismatch: {} messages vs {} category rows, keeping the first {}",
                m,
                c,
                m.min(c)
            )),
        }
    }

    Ok((0..m.min(c)).map(|i| (i, i)).collect())
}

fn align_by_id(
    messages: &Relation,
    categories: &Relation,
    id_column: &str,
) -> TransformResult<Vec<(usize, usize)>> {
    let missing = |relation: &str| TransformError::MissingColumn {
        relation: relation.to_string(),
        column: id_column.to_string(),
    };
    let msg_id = messages.column_index(id_column).ok_or_else(|| missing("messages"))?;
    let cat_id = categories.column_index(id_column).ok_or_else(|| missing("categories"))?;

    let mut by_key: HashMap<&Cell, usize> = HashMap::with_capacity(categories.row_count());
    for (i, row) in categories.rows().iter().enumerate() {
        if by_key.insert(&row[cat_id], i).is_some() {
            return Err(TransformError::DuplicateKey(row[cat_id].to_string()));
        }
    }

    let pairs = messages
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            by_key
                .get(&row[msg_id])
                .map(|&c| (i, c))
                .ok_or_else(|| TransformError::UnmatchedKey {
                    row: i,
                    key: row[msg_id].to_string(),
                })
        })
        .collect::<TransformResult<Vec<_>>>()?;

    let (m, c) = (messages.row_count(), categories.row_count());
    if m != c {
        log_warning(format!(
            "Row count mismatch: {} messages vs {} category rows, {} categories rows unused",
            m,
            c,
            c - pairs.len()
        ));
    }

    Ok(pairs)
}
