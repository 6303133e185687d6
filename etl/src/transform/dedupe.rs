//! Exact duplicate row removal.

use std::collections::HashSet;

use crate::models::Relation;

/// Drop every row equal (across all columns) to an earlier row.
///
/// The first occurrence survives and order is kept, so applying this twice
/// gives the same result as once.
pub fn dedupe(mut relation: Relation) -> Relation {
    let mut seen = HashSet::with_capacity(relation.row_count());
    relation.retain(|row| seen.insert(row.to_vec()));
    relation
}
