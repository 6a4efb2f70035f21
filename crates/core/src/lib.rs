//! tessella - document structuring for noisy recognition output.
//!
//! Turns per-word text recognition output plus independently produced
//! region detections into a single structured document: rows, logical
//! tables and ordered semantic blocks, with entity spans masked during
//! an external spelling-correction pass and restored afterwards.

pub mod content;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod params;
pub mod pipeline;

pub use content::{
    ContentResult, Entity, EntityCandidate, EntitySpan, MaskMap, SemanticBlock, SemanticDocument,
};
pub use error::{Result, StructError};
pub use geometry::Rect;
pub use layout::{DocumentLayout, LogicalTable, Region, RegionLabel, Row, Token};
pub use params::StructureParams;
pub use pipeline::{DocumentInput, NoopCorrector, Pipeline, TextCorrector};
