//! Label decoding for a single encoded categories string.

use crate::error::{TransformError, TransformResult};
use crate::models::LabelVector;

use super::schema::TOKEN_SEPARATOR;

/// Decode `name-digit;name-digit;...` into its labels, in token order.
///
/// Only the final character of each token is read. The result is not checked
/// against any schema; `row` is used for error reporting.
pub fn extract_labels(encoded: &str, row: usize) -> TransformResult<LabelVector> {
    encoded
        .split(TOKEN_SEPARATOR)
        .map(|token| parse_label(token, row))
        .collect::<TransformResult<Vec<_>>>()
        .map(LabelVector)
}

fn parse_label(token: &str, row: usize) -> TransformResult<i64> {
    let last = token.chars().next_back().ok_or_else(|| TransformError::LabelParse {
        row,
        token: token.to_string(),
        message: "empty token".to_string(),
    })?;

    last.to_digit(10)
        .map(i64::from)
        .ok_or_else(|| TransformError::LabelParse {
            row,
            token: token.to_string(),
            message: format!("'{}' is not a digit", last),
        })
}
