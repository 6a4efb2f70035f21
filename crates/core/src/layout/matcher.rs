//! Region matching: assigning recognized tokens to detected regions.
//!
//! Matching runs independently per label category over a read-only token
//! list, so categories are processed in parallel. A token straddling two
//! overlapping regions of different categories is matched into both;
//! there is no global conflict resolution by default, only the pluggable
//! [`ConflictResolver`] seam.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::geometry::{RectKey, overlap_ratio, rect_key, union};
use crate::layout::rows::{cluster_rows, sort_reading_order};
use crate::layout::table::structure::{
    accept_segment, remove_nested_tables, split_on_structure_change,
};
use crate::layout::types::{
    DocumentLayout, LogicalTable, Region, RegionBlock, RegionLabel, Token,
};
use crate::params::StructureParams;

/// Extension point for arbitrating tokens claimed by several regions.
///
/// The default keeps every claim, matching per-category independence.
/// A stricter exclusive-claim policy can be swapped in without touching
/// callers.
pub trait ConflictResolver: Send + Sync {
    /// Whether `region` may claim `token`. Called only for geometric
    /// matches.
    fn allow(&self, label: RegionLabel, region: &Region, token: &Token) -> bool;
}

/// Default resolver: every geometric match stands.
pub struct NoResolution;

impl ConflictResolver for NoResolution {
    fn allow(&self, _label: RegionLabel, _region: &Region, _token: &Token) -> bool {
        true
    }
}

/// One region together with the tokens it claimed.
#[derive(Debug, Clone)]
pub struct MatchedRegion {
    pub region: Region,
    pub tokens: Vec<Token>,
}

fn score_floor(label: RegionLabel, params: &StructureParams) -> f64 {
    match label {
        RegionLabel::Table => params.table_score_floor,
        _ => params.other_score_floor,
    }
}

/// Collects, for one category, every region above its score floor with
/// the tokens whose boxes it covers by more than the overlap threshold.
/// Tokens without a bounding box are skipped, never fatal.
pub fn match_category(
    label: RegionLabel,
    tokens: &[Token],
    regions: &[Region],
    params: &StructureParams,
    resolver: &dyn ConflictResolver,
) -> Vec<MatchedRegion> {
    let floor = score_floor(label, params);
    regions
        .iter()
        .filter(|r| r.label == label && r.score >= floor)
        .map(|region| {
            let matched: Vec<Token> = tokens
                .iter()
                .filter(|token| {
                    let Some(bbox) = token.bbox else {
                        warn!(text = %token.text, "token without bbox, skipping match");
                        return false;
                    };
                    overlap_ratio(bbox, region.bbox) > params.match_overlap_threshold
                        && resolver.allow(label, region, token)
                })
                .cloned()
                .collect();
            MatchedRegion {
                region: region.clone(),
                tokens: matched,
            }
        })
        .collect()
}

/// Structures every matched Table region: reading-order sort, row
/// clustering, segmentation on structural drift, the >= 2 rows rule,
/// and finally nested-duplicate removal across all candidates.
fn structure_tables(matched: Vec<MatchedRegion>, params: &StructureParams) -> Vec<LogicalTable> {
    let mut candidates: Vec<LogicalTable> = Vec::new();
    for m in matched {
        let sorted = sort_reading_order(&m.tokens, params.reading_order_y_threshold);
        let rows = cluster_rows(&sorted, params.row_cluster_eps);
        let segments = split_on_structure_change(
            rows,
            params.table_similarity_tolerance,
            params.min_shared_alignment,
            params.max_cell_count_diff,
        );
        candidates.extend(
            segments
                .into_iter()
                .filter_map(|segment| accept_segment(segment, m.region.score)),
        );
    }
    remove_nested_tables(candidates, params)
}

/// Groups one non-table category's matched regions into row blocks.
fn structure_elements(matched: Vec<MatchedRegion>, params: &StructureParams) -> Vec<RegionBlock> {
    matched
        .into_iter()
        .filter_map(|m| {
            let sorted = sort_reading_order(&m.tokens, params.reading_order_y_threshold);
            let rows = cluster_rows(&sorted, params.row_cluster_eps);
            if rows.is_empty() {
                return None;
            }
            let bbox = union(sorted.iter().filter_map(|t| t.bbox))?;
            Some(RegionBlock { rows, bbox })
        })
        .collect()
}

/// Matches tokens against detections and structures every category.
pub fn match_regions(
    tokens: &[Token],
    regions: &[Region],
    params: &StructureParams,
) -> DocumentLayout {
    match_regions_with(tokens, regions, params, &NoResolution)
}

/// [`match_regions`] with an explicit conflict resolver.
pub fn match_regions_with(
    tokens: &[Token],
    regions: &[Region],
    params: &StructureParams,
    resolver: &dyn ConflictResolver,
) -> DocumentLayout {
    // Categories are independent over the read-only token list.
    let per_label: Vec<(RegionLabel, Vec<MatchedRegion>)> = RegionLabel::ALL
        .par_iter()
        .map(|&label| {
            let matched = match_category(label, tokens, regions, params, resolver);
            (label, matched)
        })
        .collect();

    let mut layout = DocumentLayout::default();
    for (label, matched) in per_label {
        debug!(label = label.label_name(), regions = matched.len(), "matched category");
        if label == RegionLabel::Table {
            layout.tables = structure_tables(matched, params);
        } else {
            let blocks = structure_elements(matched, params);
            layout.elements.insert(label, blocks);
        }
    }
    layout.unmatched = unmatched_tokens(tokens, &layout);
    layout
}

/// Every token that appears in no category's matched rows.
///
/// Derived from the structured result, so a token matched into a region
/// whose rows were later discarded still counts as unmatched.
pub fn unmatched_tokens(tokens: &[Token], layout: &DocumentLayout) -> Vec<Token> {
    let mut used: FxHashSet<(&str, RectKey)> = FxHashSet::default();
    let all_rows = layout
        .tables
        .iter()
        .flat_map(|t| t.rows.iter())
        .chain(layout.elements.values().flatten().flat_map(|b| b.rows.iter()));
    for row in all_rows {
        for cell in row {
            if let Some(bbox) = cell.bbox {
                used.insert((cell.text.as_str(), rect_key(&bbox)));
            }
        }
    }
    tokens
        .iter()
        .filter(|t| match t.bbox {
            Some(bbox) => !used.contains(&(t.text.as_str(), rect_key(&bbox))),
            None => true,
        })
        .cloned()
        .collect()
}
