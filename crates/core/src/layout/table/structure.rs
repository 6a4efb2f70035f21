//! Table structuring from row sequences.
//!
//! One primitive, `rows_are_similar`, drives both the detection-backed
//! path and the geometry-only discovery path: a logical table is a
//! contiguous run of rows whose cell edges stay aligned.

use itertools::Itertools;
use tracing::debug;

use crate::geometry::{overlap_ratio, union};
use crate::layout::types::{LogicalTable, Row};
use crate::params::StructureParams;

fn sorted_edges(row: &Row, edge: impl Fn((f64, f64, f64, f64)) -> f64) -> Vec<f64> {
    row.iter()
        .filter_map(|t| t.bbox.map(&edge))
        .sorted_by(f64::total_cmp)
        .collect()
}

fn count_matches(xs1: &[f64], xs2: &[f64], tolerance: f64) -> usize {
    xs1.iter()
        .filter(|x1| xs2.iter().any(|x2| (*x1 - x2).abs() <= tolerance))
        .count()
}

/// Structural similarity of two rows.
///
/// For each of three alignment measures (sorted left edges, sorted
/// center x's, sorted right edges) counts how many values in `a` have a
/// counterpart in `b` within `tolerance`; the three counts are summed.
/// Similar iff the sum reaches `min_shared` and the cell counts differ
/// by at most `max_cell_diff`.
pub fn rows_are_similar(
    a: &Row,
    b: &Row,
    tolerance: f64,
    min_shared: usize,
    max_cell_diff: usize,
) -> bool {
    let refs_a = [
        sorted_edges(a, |b| b.0),
        sorted_edges(a, |b| (b.0 + b.2) / 2.0),
        sorted_edges(a, |b| b.2),
    ];
    let refs_b = [
        sorted_edges(b, |b| b.0),
        sorted_edges(b, |b| (b.0 + b.2) / 2.0),
        sorted_edges(b, |b| b.2),
    ];

    let matches: usize = refs_a
        .iter()
        .zip(refs_b.iter())
        .map(|(xs1, xs2)| count_matches(xs1, xs2, tolerance))
        .sum();

    let cell_diff = a.len().abs_diff(b.len());
    matches >= min_shared && cell_diff <= max_cell_diff
}

/// Walks a row sequence and splits it where the structure drifts.
///
/// Each row is compared only to the last row appended to the current
/// segment, not to the segment's first row, so slow drift across many
/// rows can accumulate undetected. Segments shorter than two rows are
/// returned as-is; acceptance is the caller's concern.
pub fn split_on_structure_change(
    rows: Vec<Row>,
    tolerance: f64,
    min_shared: usize,
    max_cell_diff: usize,
) -> Vec<Vec<Row>> {
    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return Vec::new();
    };

    let mut segments: Vec<Vec<Row>> = Vec::new();
    let mut current: Vec<Row> = vec![first];
    for row in rows {
        let prev = current.last().expect("segment is never empty");
        if rows_are_similar(prev, &row, tolerance, min_shared, max_cell_diff) {
            current.push(row);
        } else {
            debug!(rows = current.len(), "structure change, closing segment");
            segments.push(std::mem::replace(&mut current, vec![row]));
        }
    }
    segments.push(current);
    segments
}

/// Builds a logical table from a run of rows, dropping runs shorter
/// than two rows. The enclosing box is the union over every cell.
pub(crate) fn accept_segment(rows: Vec<Row>, score: f64) -> Option<LogicalTable> {
    if rows.len() < 2 {
        return None;
    }
    let bbox = union(rows.iter().flatten().filter_map(|t| t.bbox))?;
    Some(LogicalTable {
        rows,
        bbox,
        score,
        has_header: false,
    })
}

/// Removes tables whose box lies mostly inside another table's box.
///
/// For every ordered pair (a, b) with a's box covered by b's box at or
/// above the containment threshold, the lower-scoring table is marked
/// for removal. Exact score ties fall to whichever comparison runs
/// first in iteration order. Survivors keep their relative order.
pub fn remove_nested_tables(tables: Vec<LogicalTable>, params: &StructureParams) -> Vec<LogicalTable> {
    let mut to_remove = vec![false; tables.len()];
    for (i, t1) in tables.iter().enumerate() {
        for (j, t2) in tables.iter().enumerate() {
            if i == j {
                continue;
            }
            if overlap_ratio(t1.bbox, t2.bbox) >= params.nested_containment_threshold {
                if t1.score < t2.score {
                    to_remove[i] = true;
                } else {
                    to_remove[j] = true;
                }
            }
        }
    }
    tables
        .into_iter()
        .zip(to_remove)
        .filter_map(|(t, remove)| (!remove).then_some(t))
        .collect()
}
