//! Content processing: span masking and semantic assembly.

pub mod assemble;
pub mod mask;

pub use assemble::{
    CollapsedBlock, ContentResult, Entity, EntityCandidate, Metadata, PIPELINE_VERSION,
    SemanticBlock, SemanticDocument, assemble, collapse_elements,
};
pub use mask::{
    AsProvided, EntitySpan, LongestFirst, MaskMap, MaskPolicy, demask_text, demask_tokens,
    mask_tokens, mask_tokens_with,
};
