//! Document-level driver.
//!
//! Ties the stages together for one document: region matching (or
//! geometry-only table discovery when no detections exist), masking,
//! the external correction seam, demasking, table finalization and
//! semantic assembly. All stages run synchronously; a caller wanting
//! cancellation checks between documents, never mid-algorithm.

use serde::Deserialize;
use tracing::debug;

use crate::content::assemble::{ContentResult, EntityCandidate, SemanticDocument, assemble, collapse_elements};
use crate::content::mask::{EntitySpan, demask_tokens, mask_tokens};
use crate::error::{Result, StructError};
use crate::layout::matcher::{match_regions, unmatched_tokens};
use crate::layout::table::discover::{discover_tables, group_phrases};
use crate::layout::table::header::has_header;
use crate::layout::types::{DocumentLayout, Region, Token};
use crate::params::StructureParams;

/// Collaborator inputs for one document. Only the token list itself is
/// structurally required; everything else degrades to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub document_id: String,

    /// Recognition output. Absence is the one fatal condition.
    pub tokens: Option<Vec<Token>>,

    /// Detection output. An empty list switches table handling to the
    /// geometry-only discovery path.
    #[serde(default)]
    pub detections: Vec<Region>,

    /// NER candidates, applied before pattern candidates when masking.
    #[serde(default)]
    pub entities: Vec<EntityCandidate>,

    /// Pattern-extraction candidates.
    #[serde(default)]
    pub patterns: Vec<EntityCandidate>,
}

/// External spelling-correction seam.
///
/// A conforming corrector rewrites `Token::text` (recording the prior
/// text via [`Token::rewrite_text`]) and passes placeholder-bearing
/// tokens through untouched.
pub trait TextCorrector {
    fn correct(&self, tokens: &mut [Token]) -> Result<()>;
}

/// Corrector that changes nothing.
pub struct NoopCorrector;

impl TextCorrector for NoopCorrector {
    fn correct(&self, _tokens: &mut [Token]) -> Result<()> {
        Ok(())
    }
}

/// Synchronous, per-document structuring pipeline. Documents are
/// independent; a pipeline value can be shared across them, but mask
/// maps never are.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub params: StructureParams,
}

impl Pipeline {
    pub fn new(params: StructureParams) -> Self {
        Self { params }
    }

    /// Produces the per-category structured layout for one document.
    ///
    /// With detections, tokens are matched into regions per category.
    /// Without any, tables are discovered purely geometrically from
    /// token positions and unmatched is reported over the merged
    /// phrases instead of raw tokens.
    pub fn structure(&self, tokens: &[Token], detections: &[Region]) -> DocumentLayout {
        if detections.is_empty() {
            debug!("no detections, using geometry-only table discovery");
            let phrases = group_phrases(tokens, &self.params);
            let mut layout = DocumentLayout {
                tables: discover_tables(tokens, &self.params),
                ..DocumentLayout::default()
            };
            layout.unmatched = unmatched_tokens(&phrases, &layout);
            return layout;
        }
        match_regions(tokens, detections, &self.params)
    }

    /// Runs the full pipeline for one document.
    pub fn process(
        &self,
        input: DocumentInput,
        corrector: &dyn TextCorrector,
    ) -> Result<SemanticDocument> {
        let tokens = input.tokens.ok_or(StructError::MissingInput("tokens"))?;

        let layout = self.structure(&tokens, &input.detections);

        // Mask entity spans, correct, restore. The layout rows keep the
        // raw recognized text; only the text blocks carry corrections.
        let spans: Vec<EntitySpan> = input
            .entities
            .iter()
            .chain(input.patterns.iter())
            .map(|c| EntitySpan::new(c.text.clone(), c.label.clone()))
            .collect();
        let mut corrected = tokens.clone();
        let mask_map = mask_tokens(&mut corrected, &spans);
        debug!(masked = mask_map.len(), "masking complete");
        corrector.correct(&mut corrected)?;
        demask_tokens(&mut corrected, &mask_map);

        let mut tables = layout.tables;
        for table in &mut tables {
            table.has_header = has_header(&table.rows, &self.params);
        }

        let content = ContentResult {
            named_entities: input.entities,
            pattern_matches: input.patterns,
            text_corrected: corrected,
            tables,
            elements: collapse_elements(&layout.elements),
        };
        Ok(assemble(&input.document_id, &content))
    }
}
