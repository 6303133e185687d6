//! Transformation module.
//!
//! This module turns messages and encoded categories into the labelled table:
//! - Schema: category names from the first encoded string
//! - Labels: decode one encoded string
//! - Builder: decode every row and join onto the messages
//! - Dedupe: drop exact duplicate rows
//! - Pipeline: run the stages in order, plus extract/load wrappers

pub mod builder;
pub mod dedupe;
pub mod labels;
pub mod pipeline;
pub mod schema;

pub use builder::{build_relation, decode_all, JoinStrategy, RowCountPolicy};
pub use dedupe::dedupe;
pub use labels::extract_labels;
pub use pipeline::*;
pub use schema::{derive_schema, parse_schema};
