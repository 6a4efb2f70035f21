//! Structure analysis parameters.
//!
//! Contains StructureParams for controlling region matching, row
//! clustering and table detection behavior.

/// Parameters for document structure analysis.
///
/// Every threshold used downstream is carried explicitly here and passed
/// by reference into each component; nothing reads process environment.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureParams {
    /// A token belongs to a region if intersection-area / token-area
    /// exceeds this ratio.
    pub match_overlap_threshold: f64,

    /// Minimum detection score for Table regions to be considered.
    pub table_score_floor: f64,

    /// Minimum detection score for all non-Table regions.
    pub other_score_floor: f64,

    /// Tokens whose vertical centers chain within this distance land in
    /// the same row. Linkage is transitive.
    pub row_cluster_eps: f64,

    /// Vertical distance within which consecutive tokens are treated as
    /// one line during the reading-order pre-sort.
    pub reading_order_y_threshold: f64,

    /// Horizontal distance within which sorted row edges (left, center,
    /// right) count as aligned when comparing row structure.
    pub table_similarity_tolerance: f64,

    /// Minimum number of aligned edge positions (summed over the three
    /// alignment measures) for two rows to be structurally similar.
    pub min_shared_alignment: usize,

    /// Maximum difference in cell count between structurally similar
    /// rows on the detection-driven path. The geometry-only discovery
    /// path always uses 0.
    pub max_cell_count_diff: usize,

    /// A table whose box is covered by another table's box at or above
    /// this ratio is a nested duplicate; the lower-scoring one is dropped.
    pub nested_containment_threshold: f64,

    /// Maximum horizontal gap between adjacent words merged into one
    /// phrase (geometry-only discovery).
    pub phrase_gap_threshold: f64,

    /// Vertical tolerance for deciding two words share a line while
    /// building phrases.
    pub phrase_y_tolerance: f64,

    /// Rounding granularity of the vertical-center key that groups
    /// phrases into rows (geometry-only discovery).
    pub row_key_tolerance: f64,

    /// Fraction of a cell's width that must overlap a cell of the next
    /// row for the rows to be visually aligned.
    pub x_overlap_threshold: f64,

    /// Horizontal tolerance when matching cell centers across rows
    /// (column compatibility check).
    pub column_tolerance: f64,

    /// Number of cell centers allowed to miss a counterpart before two
    /// rows are column-incompatible.
    pub max_column_mismatches: usize,

    /// First row is a header when the mean per-cell class-match ratio
    /// against the remaining rows falls below this.
    pub header_similarity_threshold: f64,

    /// First row is a header when the mean per-cell symbol-difference
    /// ratio against the remaining rows exceeds this.
    pub header_symbol_threshold: f64,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            match_overlap_threshold: 0.5,
            table_score_floor: 0.7,
            other_score_floor: 0.5,
            row_cluster_eps: 15.0,
            reading_order_y_threshold: 10.0,
            table_similarity_tolerance: 25.0,
            min_shared_alignment: 2,
            max_cell_count_diff: 1,
            nested_containment_threshold: 0.8,
            phrase_gap_threshold: 10.0,
            phrase_y_tolerance: 3.0,
            row_key_tolerance: 3.0,
            x_overlap_threshold: 0.5,
            column_tolerance: 40.0,
            max_column_mismatches: 1,
            header_similarity_threshold: 0.5,
            header_symbol_threshold: 0.75,
        }
    }
}
