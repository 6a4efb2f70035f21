//! Core layout types: tokens, regions, rows, tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

fn default_confidence() -> f64 {
    1.0
}

/// One recognized text unit with its own bounding box.
///
/// Immutable once produced by recognition, except for the sanctioned
/// `text` rewrite during masking/correction; the pre-rewrite text is
/// preserved in `original_text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,

    /// Bounding box in document coordinates. Recognition output can
    /// omit it; such tokens are skipped for matching, never fatal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Rect>,

    /// Recognition confidence in [0, 1], or 1.0 where not applicable.
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Text as it was before masking or correction rewrote it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl Token {
    pub fn new(text: impl Into<String>, bbox: Rect, confidence: f64) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
            confidence,
            original_text: None,
        }
    }

    /// Rewrites `text`, recording the first pre-rewrite value as
    /// provenance. A no-op when the new text is identical.
    pub fn rewrite_text(&mut self, new_text: String) {
        if new_text == self.text {
            return;
        }
        if self.original_text.is_none() {
            self.original_text = Some(self.text.clone());
        }
        self.text = new_text;
    }
}

/// The closed set of region categories produced by layout detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionLabel {
    Title,
    #[serde(rename = "Section-header")]
    SectionHeader,
    #[serde(rename = "Page-header")]
    PageHeader,
    #[serde(rename = "Page-footer")]
    PageFooter,
    Text,
    Table,
    Caption,
    Footnote,
    Formula,
    #[serde(rename = "List-item")]
    ListItem,
    Picture,
}

impl RegionLabel {
    /// Every label, in the order categories are processed and reported.
    pub const ALL: [RegionLabel; 11] = [
        RegionLabel::Table,
        RegionLabel::Caption,
        RegionLabel::Footnote,
        RegionLabel::Formula,
        RegionLabel::ListItem,
        RegionLabel::PageFooter,
        RegionLabel::PageHeader,
        RegionLabel::SectionHeader,
        RegionLabel::Text,
        RegionLabel::Title,
        RegionLabel::Picture,
    ];

    /// External spelling used by detection collaborators.
    pub fn label_name(self) -> &'static str {
        match self {
            RegionLabel::Title => "Title",
            RegionLabel::SectionHeader => "Section-header",
            RegionLabel::PageHeader => "Page-header",
            RegionLabel::PageFooter => "Page-footer",
            RegionLabel::Text => "Text",
            RegionLabel::Table => "Table",
            RegionLabel::Caption => "Caption",
            RegionLabel::Footnote => "Footnote",
            RegionLabel::Formula => "Formula",
            RegionLabel::ListItem => "List-item",
            RegionLabel::Picture => "Picture",
        }
    }

    /// Singular, lowercased block type used in the semantic document.
    pub fn block_name(self) -> &'static str {
        match self {
            RegionLabel::Title => "title",
            RegionLabel::SectionHeader => "section_header",
            RegionLabel::PageHeader => "page_header",
            RegionLabel::PageFooter => "page_footer",
            RegionLabel::Text => "text",
            RegionLabel::Table => "table",
            RegionLabel::Caption => "caption",
            RegionLabel::Footnote => "footnote",
            RegionLabel::Formula => "formula",
            RegionLabel::ListItem => "list_item",
            RegionLabel::Picture => "picture",
        }
    }
}

/// A labeled rectangular area predicted by an external detection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "box")]
    pub bbox: Rect,
    #[serde(rename = "label_name")]
    pub label: RegionLabel,
    pub score: f64,
}

/// Tokens judged to share one visual text line, ordered left to right.
/// Never empty.
pub type Row = Vec<Token>;

/// Grouped rows of one non-table region, with their enclosing box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionBlock {
    pub rows: Vec<Row>,
    pub bbox: Rect,
}

/// A contiguous run of structurally similar rows. Always has >= 2 rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalTable {
    pub rows: Vec<Row>,
    pub bbox: Rect,
    pub score: f64,
    #[serde(default)]
    pub has_header: bool,
}

/// Per-category structured layout for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentLayout {
    /// Finalized logical tables, nested duplicates removed.
    pub tables: Vec<LogicalTable>,

    /// Grouped rows for every non-table category, keyed by label.
    pub elements: IndexMap<RegionLabel, Vec<RegionBlock>>,

    /// Tokens claimed by no category across the whole result. Can
    /// under-report for tokens matched by one category but filtered
    /// from final output by another.
    pub unmatched: Vec<Token>,
}
