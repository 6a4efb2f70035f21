//! Geometry-only table discovery.
//!
//! Finds logical tables in text-native documents where no detection
//! network supplies Table regions: words merge into phrases, phrases
//! group into rows, and row runs that stay aligned become tables.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::geometry::{Rect, union};
use crate::layout::table::structure::{accept_segment, rows_are_similar};
use crate::layout::types::{LogicalTable, Row, Token};
use crate::params::StructureParams;

/// Merges adjacent words on one line into phrase tokens.
///
/// Words sort top-to-bottom then left-to-right; consecutive words whose
/// top edges stay within the line tolerance share a line, and words on
/// one line merge while the horizontal gap between them stays below the
/// gap threshold. A phrase carries the joined text, the union box and
/// the mean confidence of its words.
pub fn group_phrases(tokens: &[Token], params: &StructureParams) -> Vec<Token> {
    let mut words: Vec<(Rect, &Token)> = tokens
        .iter()
        .filter_map(|t| t.bbox.map(|b| (b, t)))
        .collect();
    words.sort_by(|(ba, _), (bb, _)| {
        let ka = (ba.1 * 10.0).round() / 10.0;
        let kb = (bb.1 * 10.0).round() / 10.0;
        ka.total_cmp(&kb).then(ba.0.total_cmp(&bb.0))
    });

    let mut lines: Vec<Vec<(Rect, &Token)>> = Vec::new();
    let mut current: Vec<(Rect, &Token)> = Vec::new();
    let mut current_top = 0.0;
    for (bbox, word) in words {
        if !current.is_empty() && (bbox.1 - current_top).abs() > params.phrase_y_tolerance {
            lines.push(std::mem::take(&mut current));
        }
        current_top = bbox.1;
        current.push((bbox, word));
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let mut groups: Vec<Vec<(Rect, &Token)>> = Vec::new();
    for line in lines {
        let mut phrase: Vec<(Rect, &Token)> = vec![line[0]];
        for pair in line.windows(2) {
            let ((b1, _), (b2, w2)) = (pair[0], pair[1]);
            if b2.0 - b1.2 < params.phrase_gap_threshold {
                phrase.push((b2, w2));
            } else {
                groups.push(std::mem::replace(&mut phrase, vec![(b2, w2)]));
            }
        }
        groups.push(phrase);
    }

    groups
        .into_iter()
        .filter_map(|group| {
            let text = group.iter().map(|(_, w)| w.text.as_str()).join(" ");
            let bbox = union(group.iter().map(|(b, _)| *b))?;
            let confidence =
                group.iter().map(|(_, w)| w.confidence).sum::<f64>() / group.len() as f64;
            Some(Token::new(text, bbox, confidence))
        })
        .collect()
}

/// Groups phrases into rows by a rounded vertical-center key, rows top
/// to bottom, phrases within a row left to right.
pub fn group_into_rows(phrases: &[Token], tolerance: f64) -> Vec<Row> {
    let mut rows: BTreeMap<i64, Row> = BTreeMap::new();
    for phrase in phrases {
        let Some(bbox) = phrase.bbox else { continue };
        let y_center = (bbox.1 + bbox.3) / 2.0;
        let key = (y_center / tolerance).round() as i64;
        rows.entry(key).or_default().push(phrase.clone());
    }
    rows.into_values()
        .map(|mut row| {
            row.sort_by(|a, b| {
                let xa = a.bbox.map(|b| b.0).unwrap_or(0.0);
                let xb = b.bbox.map(|b| b.0).unwrap_or(0.0);
                xa.total_cmp(&xb)
            });
            row
        })
        .collect()
}

/// Visual alignment: at least half the cells of the shorter row must
/// x-overlap some cell of the other row by more than the threshold
/// fraction of the wider cell.
fn rows_are_visually_aligned(row1: &Row, row2: &Row, threshold: f64) -> bool {
    if row1.is_empty() || row2.is_empty() {
        return false;
    }
    let mut overlaps = 0usize;
    for cell1 in row1 {
        let Some((l1, _, r1, _)) = cell1.bbox else { continue };
        for cell2 in row2 {
            let Some((l2, _, r2, _)) = cell2.bbox else { continue };
            let overlap = (r1.min(r2) - l1.max(l2)).max(0.0);
            let width = (r1 - l1).max(r2 - l2);
            if width > 0.0 && overlap / width > threshold {
                overlaps += 1;
                break;
            }
        }
    }
    overlaps as f64 >= row1.len().min(row2.len()) as f64 / 2.0
}

/// Column compatibility: every cell center in `row1` needs a counterpart
/// center in `row2` within the tolerance, allowing a bounded number of
/// mismatches.
fn columns_are_compatible(
    row1: &Row,
    row2: &Row,
    tolerance: f64,
    max_mismatches: usize,
) -> bool {
    let centers = |row: &Row| -> Vec<f64> {
        row.iter()
            .filter_map(|c| c.bbox.map(|b| (b.0 + b.2) / 2.0))
            .collect()
    };
    let c1 = centers(row1);
    let c2 = centers(row2);
    let mismatches = c1
        .iter()
        .filter(|xc1| !c2.iter().any(|xc2| (*xc1 - xc2).abs() < tolerance))
        .count();
    mismatches <= max_mismatches
}

/// Splits row sequences into logical tables on the geometry-only path.
///
/// Single-cell rows never enter a table. A row extends the current run
/// only when it is visually aligned with, structurally similar to (cell
/// counts must match exactly on this path) and column-compatible with
/// the previous row; otherwise the run closes under the usual >= 2 rows
/// rule.
pub fn split_rows_into_logical_tables(rows: Vec<Row>, params: &StructureParams) -> Vec<Vec<Row>> {
    let mut tables: Vec<Vec<Row>> = Vec::new();
    let mut current: Vec<Row> = Vec::new();

    for row in rows {
        if row.len() <= 1 {
            continue;
        }
        let Some(prev) = current.last() else {
            current.push(row);
            continue;
        };

        let fits = rows_are_visually_aligned(prev, &row, params.x_overlap_threshold)
            && rows_are_similar(
                prev,
                &row,
                params.table_similarity_tolerance,
                params.min_shared_alignment,
                0,
            )
            && columns_are_compatible(
                prev,
                &row,
                params.column_tolerance,
                params.max_column_mismatches,
            );

        if fits {
            current.push(row);
        } else {
            if current.len() > 1 {
                tables.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current.push(row);
        }
    }
    if current.len() > 1 {
        tables.push(current);
    }
    tables
}

/// Discovers logical tables from raw tokens without any detections.
///
/// Discovered tables carry score 1.0, mirroring the token convention of
/// confidence 1.0 where no model score applies.
pub fn discover_tables(tokens: &[Token], params: &StructureParams) -> Vec<LogicalTable> {
    let phrases = group_phrases(tokens, params);
    let rows = group_into_rows(&phrases, params.row_key_tolerance);
    split_rows_into_logical_tables(rows, params)
        .into_iter()
        .filter_map(|segment| accept_segment(segment, 1.0))
        .collect()
}
