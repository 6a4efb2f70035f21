//! Semantic block assembly.
//!
//! Merges entities, corrected text rows, finalized tables and collapsed
//! layout elements into one deduplicated, priority-ordered block list.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{Rect, RectKey, rect_key, union};
use crate::layout::types::{LogicalTable, RegionBlock, RegionLabel, Token};

/// Version tag stamped into every semantic document.
pub const PIPELINE_VERSION: &str = "v1.0";

fn default_score() -> f64 {
    1.0
}

/// An entity or pattern candidate as delivered by collaborators.
/// NER output spells the text field `entity`; pattern extractors spell
/// it `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCandidate {
    #[serde(alias = "entity")]
    pub text: String,
    pub label: String,
    #[serde(default = "default_score")]
    pub score: f64,
}

/// An extracted entity in the final document, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub text: String,
    pub confidence: f64,
    pub source: String,
}

/// One ordered unit of the final document.
///
/// Deduplicated by `(type, text, bbox)`; the first occurrence wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<String>>>,
    pub bbox: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub created_at: String,
    pub pipeline_version: String,
}

/// The final structured document handed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticDocument {
    pub document_id: String,
    pub entities: Vec<Entity>,
    pub blocks: Vec<SemanticBlock>,
    pub metadata: Metadata,
}

/// A non-table region collapsed to one text span: joined cell text,
/// union box, rounded mean confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapsedBlock {
    pub text: String,
    pub bbox: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Everything the assembler consumes for one document.
#[derive(Debug, Clone, Default)]
pub struct ContentResult {
    /// NER candidates, listed before pattern matches.
    pub named_entities: Vec<EntityCandidate>,
    /// Pattern-extraction candidates.
    pub pattern_matches: Vec<EntityCandidate>,
    /// Corrected and demasked token list.
    pub text_corrected: Vec<Token>,
    /// Finalized tables with header judgement applied.
    pub tables: Vec<LogicalTable>,
    /// Collapsed blocks for every non-text, non-table category.
    pub elements: IndexMap<RegionLabel, Vec<CollapsedBlock>>,
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Collapses each region's grouped rows into a single text block with a
/// union box and the rounded mean cell confidence. Categories already
/// represented as text or table blocks are skipped by the assembler,
/// not here.
pub fn collapse_elements(
    elements: &IndexMap<RegionLabel, Vec<RegionBlock>>,
) -> IndexMap<RegionLabel, Vec<CollapsedBlock>> {
    let mut collapsed: IndexMap<RegionLabel, Vec<CollapsedBlock>> = IndexMap::new();
    for (&label, blocks) in elements {
        let entries: Vec<CollapsedBlock> = blocks
            .iter()
            .filter_map(|block| {
                let cells: Vec<&Token> = block.rows.iter().flatten().collect();
                if cells.is_empty() {
                    return None;
                }
                let text = cells.iter().map(|c| c.text.trim()).join(" ");
                let bbox = union(cells.iter().filter_map(|c| c.bbox))?;
                let confidence =
                    cells.iter().map(|c| c.confidence).sum::<f64>() / cells.len() as f64;
                Some(CollapsedBlock {
                    text,
                    bbox,
                    confidence: Some(round3(confidence)),
                })
            })
            .collect();
        collapsed.insert(label, entries);
    }
    collapsed
}

fn block_priority(block_type: &str) -> u32 {
    match block_type {
        "title" => 0,
        "section_header" => 1,
        "page_header" => 2,
        "text" => 3,
        "table" => 4,
        "footnote" => 5,
        _ => 99,
    }
}

/// Merges all typed outputs into one deduplicated, ordered document.
pub fn assemble(document_id: &str, content: &ContentResult) -> SemanticDocument {
    let mut entities: Vec<Entity> = Vec::new();
    for candidate in &content.named_entities {
        entities.push(Entity {
            entity_type: candidate.label.clone(),
            text: candidate.text.clone(),
            confidence: candidate.score,
            source: "ner".to_string(),
        });
    }
    for candidate in &content.pattern_matches {
        entities.push(Entity {
            entity_type: candidate.label.clone(),
            text: candidate.text.clone(),
            confidence: candidate.score,
            source: "regex".to_string(),
        });
    }

    let mut blocks: Vec<SemanticBlock> = Vec::new();
    let mut seen: FxHashSet<(String, Option<String>, RectKey)> = FxHashSet::default();
    let mut push_block = |blocks: &mut Vec<SemanticBlock>, block: SemanticBlock| {
        let key = (
            block.block_type.clone(),
            block.text.clone(),
            rect_key(&block.bbox),
        );
        if seen.insert(key) {
            blocks.push(block);
        }
    };

    // Corrected text rows
    for token in &content.text_corrected {
        let Some(bbox) = token.bbox else {
            warn!(text = %token.text, "text token without bbox, skipping block");
            continue;
        };
        push_block(
            &mut blocks,
            SemanticBlock {
                block_type: "text".to_string(),
                text: Some(token.text.clone()),
                header: None,
                rows: None,
                bbox,
                confidence: Some(token.confidence),
                score: None,
                has_header: None,
                source: None,
            },
        );
    }

    // Tables
    for table in &content.tables {
        if table.rows.is_empty() {
            continue;
        }
        let cell_texts =
            |row: &[Token]| -> Vec<String> { row.iter().map(|c| c.text.clone()).collect() };
        let (header, data_rows) = if table.has_header {
            (
                cell_texts(&table.rows[0]),
                table.rows[1..].iter().map(|r| cell_texts(r)).collect(),
            )
        } else {
            (
                (0..table.rows[0].len()).map(|i| format!("col_{i}")).collect(),
                table.rows.iter().map(|r| cell_texts(r)).collect(),
            )
        };
        push_block(
            &mut blocks,
            SemanticBlock {
                block_type: "table".to_string(),
                text: None,
                header: Some(header),
                rows: Some(data_rows),
                bbox: table.bbox,
                confidence: None,
                score: Some(table.score),
                has_header: Some(table.has_header),
                source: None,
            },
        );
    }

    // Every other category, skipping those already represented above
    for (&label, entries) in &content.elements {
        let block_type = label.block_name();
        if block_type == "text" || block_type == "table" {
            continue;
        }
        for entry in entries {
            push_block(
                &mut blocks,
                SemanticBlock {
                    block_type: block_type.to_string(),
                    text: Some(entry.text.clone()),
                    header: None,
                    rows: None,
                    bbox: entry.bbox,
                    confidence: entry.confidence,
                    score: None,
                    has_header: None,
                    source: Some("layout".to_string()),
                },
            );
        }
    }

    // Stable priority sort; ties keep their relative order
    blocks.sort_by_key(|b| block_priority(&b.block_type));

    SemanticDocument {
        document_id: document_id.to_string(),
        entities,
        blocks,
        metadata: Metadata {
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            pipeline_version: PIPELINE_VERSION.to_string(),
        },
    }
}
