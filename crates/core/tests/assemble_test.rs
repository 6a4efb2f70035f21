//! Tests for semantic block assembly and element collapsing.

use indexmap::IndexMap;
use tessella_core::content::assemble::{
    CollapsedBlock, ContentResult, EntityCandidate, PIPELINE_VERSION, assemble, collapse_elements,
};
use tessella_core::layout::{LogicalTable, RegionBlock, RegionLabel, Token};

fn token(text: &str, bbox: (f64, f64, f64, f64), confidence: f64) -> Token {
    Token::new(text, bbox, confidence)
}

fn candidate(text: &str, label: &str, score: f64) -> EntityCandidate {
    EntityCandidate {
        text: text.to_string(),
        label: label.to_string(),
        score,
    }
}

// ============================================================================
// Element collapsing
// ============================================================================

#[test]
fn test_collapse_joins_cells_with_union_box() {
    let mut elements = IndexMap::new();
    elements.insert(
        RegionLabel::Caption,
        vec![RegionBlock {
            rows: vec![
                vec![
                    token("Figure", (0.0, 0.0, 30.0, 10.0), 0.9),
                    token(" 1: ", (35.0, 0.0, 50.0, 10.0), 0.8),
                ],
                vec![token("overview", (0.0, 12.0, 40.0, 22.0), 0.7)],
            ],
            bbox: (0.0, 0.0, 50.0, 22.0),
        }],
    );

    let collapsed = collapse_elements(&elements);
    let blocks = &collapsed[&RegionLabel::Caption];
    assert_eq!(blocks.len(), 1);
    // Cell texts are trimmed before joining.
    assert_eq!(blocks[0].text, "Figure 1: overview");
    assert_eq!(blocks[0].bbox, (0.0, 0.0, 50.0, 22.0));
    // Mean of 0.9, 0.8, 0.7 rounded to three decimals.
    assert_eq!(blocks[0].confidence, Some(0.8));
}

#[test]
fn test_collapse_confidence_rounds_to_three_decimals() {
    let mut elements = IndexMap::new();
    elements.insert(
        RegionLabel::Footnote,
        vec![RegionBlock {
            rows: vec![vec![
                token("a", (0.0, 0.0, 5.0, 5.0), 0.1),
                token("b", (6.0, 0.0, 10.0, 5.0), 0.2),
                token("c", (11.0, 0.0, 15.0, 5.0), 0.2),
            ]],
            bbox: (0.0, 0.0, 15.0, 5.0),
        }],
    );

    let collapsed = collapse_elements(&elements);
    // Mean 0.16666... rounds to 0.167.
    assert_eq!(collapsed[&RegionLabel::Footnote][0].confidence, Some(0.167));
}

#[test]
fn test_collapse_skips_empty_blocks() {
    let mut elements = IndexMap::new();
    elements.insert(
        RegionLabel::Formula,
        vec![RegionBlock {
            rows: Vec::new(),
            bbox: (0.0, 0.0, 10.0, 10.0),
        }],
    );
    let collapsed = collapse_elements(&elements);
    assert!(collapsed[&RegionLabel::Formula].is_empty());
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_entities_keep_source_and_order() {
    let content = ContentResult {
        named_entities: vec![candidate("Anna", "person", 0.95)],
        pattern_matches: vec![candidate("DE44 1234", "iban", 1.0)],
        ..ContentResult::default()
    };

    let doc = assemble("doc-1", &content);
    assert_eq!(doc.document_id, "doc-1");
    assert_eq!(doc.entities.len(), 2);
    assert_eq!(doc.entities[0].source, "ner");
    assert_eq!(doc.entities[0].entity_type, "person");
    assert_eq!(doc.entities[1].source, "regex");
    assert_eq!(doc.metadata.pipeline_version, PIPELINE_VERSION);
}

#[test]
fn test_blocks_sorted_by_priority_stably() {
    let mut elements = IndexMap::new();
    elements.insert(
        RegionLabel::Title,
        vec![CollapsedBlock {
            text: "Report".to_string(),
            bbox: (0.0, 0.0, 100.0, 10.0),
            confidence: Some(1.0),
        }],
    );
    elements.insert(
        RegionLabel::Footnote,
        vec![CollapsedBlock {
            text: "see appendix".to_string(),
            bbox: (0.0, 200.0, 100.0, 210.0),
            confidence: Some(1.0),
        }],
    );
    let content = ContentResult {
        text_corrected: vec![
            token("first paragraph", (0.0, 20.0, 100.0, 30.0), 0.9),
            token("second paragraph", (0.0, 40.0, 100.0, 50.0), 0.9),
        ],
        tables: vec![LogicalTable {
            rows: vec![
                vec![token("a", (0.0, 60.0, 10.0, 70.0), 1.0)],
                vec![token("b", (0.0, 80.0, 10.0, 90.0), 1.0)],
            ],
            bbox: (0.0, 60.0, 10.0, 90.0),
            score: 0.9,
            has_header: false,
        }],
        elements,
        ..ContentResult::default()
    };

    let doc = assemble("doc-2", &content);
    let types: Vec<&str> = doc.blocks.iter().map(|b| b.block_type.as_str()).collect();
    assert_eq!(types, vec!["title", "text", "text", "table", "footnote"]);
    // Equal-priority blocks keep their insertion order.
    assert_eq!(doc.blocks[1].text.as_deref(), Some("first paragraph"));
    assert_eq!(doc.blocks[2].text.as_deref(), Some("second paragraph"));
}

#[test]
fn test_duplicate_blocks_removed_first_wins() {
    let content = ContentResult {
        text_corrected: vec![
            token("same", (0.0, 0.0, 10.0, 10.0), 0.9),
            token("same", (0.0, 0.0, 10.0, 10.0), 0.4),
            // Same text, different box: not a duplicate.
            token("same", (0.0, 20.0, 10.0, 30.0), 0.9),
        ],
        ..ContentResult::default()
    };

    let doc = assemble("doc-3", &content);
    assert_eq!(doc.blocks.len(), 2);
    assert_eq!(doc.blocks[0].confidence, Some(0.9));
}

#[test]
fn test_table_block_header_synthesis() {
    let real_header = LogicalTable {
        rows: vec![
            vec![
                token("Name", (0.0, 0.0, 20.0, 10.0), 1.0),
                token("Price", (50.0, 0.0, 70.0, 10.0), 1.0),
            ],
            vec![
                token("Apple", (0.0, 20.0, 20.0, 30.0), 1.0),
                token("2", (50.0, 20.0, 60.0, 30.0), 1.0),
            ],
        ],
        bbox: (0.0, 0.0, 70.0, 30.0),
        score: 0.9,
        has_header: true,
    };
    let no_header = LogicalTable {
        rows: vec![
            vec![
                token("1", (0.0, 100.0, 10.0, 110.0), 1.0),
                token("2", (50.0, 100.0, 60.0, 110.0), 1.0),
            ],
            vec![
                token("3", (0.0, 120.0, 10.0, 130.0), 1.0),
                token("4", (50.0, 120.0, 60.0, 130.0), 1.0),
            ],
        ],
        bbox: (0.0, 100.0, 60.0, 130.0),
        score: 0.8,
        has_header: false,
    };
    let content = ContentResult {
        tables: vec![real_header, no_header],
        ..ContentResult::default()
    };

    let doc = assemble("doc-4", &content);
    assert_eq!(doc.blocks.len(), 2);

    let first = &doc.blocks[0];
    assert_eq!(first.header.as_deref(), Some(&["Name".to_string(), "Price".to_string()][..]));
    assert_eq!(first.rows.as_deref().map(|r| r.len()), Some(1));
    assert_eq!(first.has_header, Some(true));
    assert_eq!(first.score, Some(0.9));

    let second = &doc.blocks[1];
    assert_eq!(second.header.as_deref(), Some(&["col_0".to_string(), "col_1".to_string()][..]));
    // Without a header every row is data.
    assert_eq!(second.rows.as_deref().map(|r| r.len()), Some(2));
}

#[test]
fn test_text_and_table_categories_not_duplicated_from_elements() {
    // A collapsed Text entry must not produce a second "text" block
    // alongside the corrected token stream.
    let mut elements = IndexMap::new();
    elements.insert(
        RegionLabel::Text,
        vec![CollapsedBlock {
            text: "body".to_string(),
            bbox: (0.0, 0.0, 10.0, 10.0),
            confidence: Some(1.0),
        }],
    );
    let content = ContentResult {
        elements,
        ..ContentResult::default()
    };

    let doc = assemble("doc-5", &content);
    assert!(doc.blocks.is_empty());
}

#[test]
fn test_layout_blocks_carry_source() {
    let mut elements = IndexMap::new();
    elements.insert(
        RegionLabel::PageHeader,
        vec![CollapsedBlock {
            text: "ACME Corp".to_string(),
            bbox: (0.0, 0.0, 100.0, 10.0),
            confidence: Some(0.95),
        }],
    );
    let content = ContentResult {
        elements,
        ..ContentResult::default()
    };

    let doc = assemble("doc-6", &content);
    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(doc.blocks[0].block_type, "page_header");
    assert_eq!(doc.blocks[0].source.as_deref(), Some("layout"));
}

#[test]
fn test_text_block_without_bbox_is_skipped() {
    let mut boxless = Token::new("ghost", (0.0, 0.0, 0.0, 0.0), 1.0);
    boxless.bbox = None;
    let content = ContentResult {
        text_corrected: vec![boxless, token("real", (0.0, 0.0, 10.0, 10.0), 0.9)],
        ..ContentResult::default()
    };

    let doc = assemble("doc-7", &content);
    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(doc.blocks[0].text.as_deref(), Some("real"));
}
