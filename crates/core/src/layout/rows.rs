//! Row clustering: grouping matched tokens into ordered text lines.

use crate::layout::types::{Row, Token};

fn vcenter(t: &Token) -> Option<f64> {
    t.bbox.map(|b| (b.1 + b.3) / 2.0)
}

/// Sorts tokens into reading order: top to bottom, then left to right
/// within each line. Two consecutive tokens whose top edges differ by at
/// most `y_threshold` share a line.
pub fn sort_reading_order(tokens: &[Token], y_threshold: f64) -> Vec<Token> {
    let mut entries: Vec<Token> = tokens.iter().filter(|t| t.bbox.is_some()).cloned().collect();
    if entries.is_empty() {
        return entries;
    }
    entries.sort_by(|a, b| {
        let ya = a.bbox.map(|b| b.1).unwrap_or(0.0);
        let yb = b.bbox.map(|b| b.1).unwrap_or(0.0);
        ya.total_cmp(&yb)
    });

    let mut sorted = Vec::with_capacity(entries.len());
    let mut line: Vec<Token> = Vec::new();
    for entry in entries {
        let y = entry.bbox.map(|b| b.1).unwrap_or(0.0);
        match line.last().and_then(|t| t.bbox.map(|b| b.1)) {
            Some(prev_y) if (y - prev_y).abs() > y_threshold => {
                line.sort_by(|a, b| {
                    let xa = a.bbox.map(|b| b.0).unwrap_or(0.0);
                    let xb = b.bbox.map(|b| b.0).unwrap_or(0.0);
                    xa.total_cmp(&xb)
                });
                sorted.append(&mut line);
                line.push(entry);
            }
            _ => line.push(entry),
        }
    }
    line.sort_by(|a, b| {
        let xa = a.bbox.map(|b| b.0).unwrap_or(0.0);
        let xb = b.bbox.map(|b| b.0).unwrap_or(0.0);
        xa.total_cmp(&xb)
    });
    sorted.append(&mut line);
    sorted
}

/// Groups tokens into rows by transitive vertical proximity.
///
/// Two tokens link when their vertical centers differ by at most `eps`;
/// rows are the connected components of that relation, so a chain a-b-c
/// merges into one row even when |a - c| exceeds eps. On a single axis
/// the components are exactly the maximal runs of center-sorted tokens
/// with consecutive gaps <= eps.
///
/// Within a row tokens are ordered left to right by x0; rows are ordered
/// top to bottom by the mean vertical center of their tokens. Empty
/// input yields empty output; rows are never empty.
pub fn cluster_rows(tokens: &[Token], eps: f64) -> Vec<Row> {
    let mut centered: Vec<(f64, Token)> = tokens
        .iter()
        .filter_map(|t| vcenter(t).map(|c| (c, t.clone())))
        .collect();
    if centered.is_empty() {
        return Vec::new();
    }
    centered.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut rows: Vec<Row> = Vec::new();
    let mut current: Row = Vec::new();
    let mut prev_center = centered[0].0;
    for (center, token) in centered {
        if !current.is_empty() && center - prev_center > eps {
            rows.push(std::mem::take(&mut current));
        }
        current.push(token);
        prev_center = center;
    }
    if !current.is_empty() {
        rows.push(current);
    }

    for row in &mut rows {
        row.sort_by(|a, b| {
            let xa = a.bbox.map(|b| b.0).unwrap_or(0.0);
            let xb = b.bbox.map(|b| b.0).unwrap_or(0.0);
            xa.total_cmp(&xb)
        });
    }
    // Runs of sorted centers are already top-to-bottom by mean center.
    rows
}
