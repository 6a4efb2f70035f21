//! Table header detection and tabular record conversion.
//!
//! A header row is recognized by contrast: cells are classified into
//! coarse content classes, and a first row whose classes or symbol
//! usage diverge enough from the body is judged a header.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::layout::types::{LogicalTable, Row};
use crate::params::StructureParams;

static FLOAT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+\.\d+$").expect("valid regex"));
static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").expect("valid regex"));

const UNIT_SYMBOLS: [char; 3] = ['%', '‰', '°'];
const CURRENCY_SYMBOLS: [char; 4] = ['€', '$', '£', '¥'];

/// Coarse content class of one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    Money,
    Float,
    Int,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellProfile {
    pub class: CellClass,
    pub has_symbol: bool,
}

/// Classifies a cell by content. Money beats numeric classes; numeric
/// detection normalizes thousands separators ('.') and decimal commas
/// before matching.
pub fn classify_cell(text: &str) -> CellProfile {
    let trimmed = text.trim();
    let has_symbol = trimmed.contains(&UNIT_SYMBOLS[..]);
    let is_money = trimmed.contains(&CURRENCY_SYMBOLS[..]);

    let normalized = trimmed.replace('.', "").replace(',', ".");
    let numeric_part = normalized.replace(' ', "");

    let class = if is_money {
        CellClass::Money
    } else if FLOAT_RE.is_match(&numeric_part) {
        CellClass::Float
    } else if INT_RE.is_match(&numeric_part) {
        CellClass::Int
    } else {
        CellClass::Str
    };

    CellProfile { class, has_symbol }
}

fn profile_row(row: &Row) -> Vec<CellProfile> {
    row.iter().map(|cell| classify_cell(&cell.text)).collect()
}

fn class_similarity(a: &[CellProfile], b: &[CellProfile]) -> f64 {
    let denom = a.len().max(b.len());
    if denom == 0 {
        return 0.0;
    }
    let matches = a.iter().zip(b).filter(|(x, y)| x.class == y.class).count();
    matches as f64 / denom as f64
}

fn symbol_difference(a: &[CellProfile], b: &[CellProfile]) -> f64 {
    let denom = a.len().max(b.len());
    if denom == 0 {
        return 0.0;
    }
    let diffs = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.has_symbol != y.has_symbol)
        .count();
    diffs as f64 / denom as f64
}

/// Judges whether the first row of a table is a header.
///
/// Compares the first row against every other row: when the mean
/// per-cell class-match ratio falls below the similarity threshold, or
/// the mean symbol-difference ratio exceeds the symbol threshold, the
/// first row stands apart from the body. Fewer than two rows never have
/// a header.
pub fn has_header(rows: &[Row], params: &StructureParams) -> bool {
    if rows.len() < 2 {
        return false;
    }
    let profiles: Vec<Vec<CellProfile>> = rows.iter().map(profile_row).collect();
    let (first, body) = profiles.split_first().expect("len checked above");

    let mean_similarity = body
        .iter()
        .map(|row| class_similarity(first, row))
        .sum::<f64>()
        / body.len() as f64;
    let mean_symbol_diff = body
        .iter()
        .map(|row| symbol_difference(first, row))
        .sum::<f64>()
        / body.len() as f64;

    mean_similarity < params.header_similarity_threshold
        || mean_symbol_diff > params.header_symbol_threshold
}

/// Converts a table to keyed records: a header row (real, or synthesized
/// `col_i` names when none was detected) plus one `pos_n` record per
/// remaining row mapping column name to cell text.
///
/// Rows with more cells than the header never error; surplus columns
/// get synthesized `col_j` names.
pub fn table_records(table: &LogicalTable) -> Value {
    let rows = &table.rows;
    if rows.is_empty() {
        return Value::Object(Map::new());
    }

    let (header, data_rows): (Vec<String>, &[Row]) = if table.has_header {
        (
            rows[0].iter().map(|c| c.text.trim().to_string()).collect(),
            &rows[1..],
        )
    } else {
        (
            (0..rows[0].len()).map(|i| format!("col_{i}")).collect(),
            &rows[..],
        )
    };

    let mut records = Map::new();
    for (i, row) in data_rows.iter().enumerate() {
        let mut record = Map::new();
        for (j, cell) in row.iter().enumerate() {
            let col_name = header
                .get(j)
                .cloned()
                .unwrap_or_else(|| format!("col_{j}"));
            record.insert(col_name, Value::String(cell.text.trim().to_string()));
        }
        records.insert(format!("pos_{}", i + 1), Value::Object(record));
    }
    Value::Object(records)
}
