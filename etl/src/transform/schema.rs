//! Category schema derivation.
//!
//! The schema comes from the first categories row only; every other row is
//! assumed to list the same names in the same order.

use crate::error::{TransformError, TransformResult};
use crate::models::{Cell, CategorySchema, Relation};

/// Separator between tokens in an encoded categories string.
pub const TOKEN_SEPARATOR: char = ';';

/// Separator between a category name and its label.
pub const LABEL_SEPARATOR: char = '-';

/// Derive the ordered category names from the first row of `categories`.
///
/// Each `;` token must end with `-` and exactly one label character; the
/// name is whatever precedes those two characters.
pub fn derive_schema(categories: &Relation, column: &str) -> TransformResult<CategorySchema> {
    let idx = categories
        .column_index(column)
        .ok_or_else(|| TransformError::MissingColumn {
            relation: "categories".to_string(),
            column: column.to_string(),
        })?;

    let first = categories
        .rows()
        .first()
        .ok_or_else(|| TransformError::Format("categories relation is empty".to_string()))?;

    let encoded = match &first[idx] {
        Cell::Text(s) => s.as_str(),
        other => {
            return Err(TransformError::Format(format!(
                "first row holds {} instead of an encoded string",
                other
            )))
        }
    };

    parse_schema(encoded)
}

/// Parse category names out of one encoded string.
pub fn parse_schema(encoded: &str) -> TransformResult<CategorySchema> {
    let mut names = Vec::new();

    for token in encoded.split(TOKEN_SEPARATOR) {
        let mut chars = token.chars();
        let label = chars.next_back();
        let separator = chars.next_back();
        let name = chars.as_str();

        match (separator, label) {
            (Some(LABEL_SEPARATOR), Some(_)) if !name.is_empty() => names.push(name.to_string()),
            _ => {
                return Err(TransformError::Format(format!(
                    "token '{}' in '{}' is not of the form <name>-<label>",
                    token, encoded
                )))
            }
        }
    }

    Ok(CategorySchema::new(names))
}
