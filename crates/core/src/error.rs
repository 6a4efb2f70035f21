//! Error types for the tessella document structuring library.

use thiserror::Error;

/// Primary error type for document structuring operations.
///
/// The algorithms themselves degrade on bad data instead of erroring
/// (empty inputs produce empty outputs, degenerate tables synthesize
/// placeholder columns). The only fatal condition is a structurally
/// missing upstream input.
#[derive(Error, Debug)]
pub enum StructError {
    #[error("required input missing: {0}")]
    MissingInput(&'static str),

    #[error("correction failed: {0}")]
    CorrectionError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type alias for StructError.
pub type Result<T> = std::result::Result<T, StructError>;
