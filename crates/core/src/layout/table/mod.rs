//! Logical table detection.
//!
//! Two paths share one similarity primitive: the detection-backed path
//! structures tokens matched into Table regions, and the geometry-only
//! path discovers tables directly from token positions in text-native
//! documents.

pub mod discover;
pub mod header;
pub mod structure;

pub use discover::{discover_tables, group_into_rows, group_phrases};
pub use header::{CellClass, CellProfile, classify_cell, has_header, table_records};
pub use structure::{remove_nested_tables, rows_are_similar, split_on_structure_change};
