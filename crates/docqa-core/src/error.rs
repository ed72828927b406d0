use thiserror::Error;

/// Failure taxonomy for the pipeline.
///
/// `EmbeddingService` is the only transient variant; the embedder
/// retries it with a shrinking batch width before giving up. The rest
/// are configuration-class failures with no retry. Generation failures
/// never appear here: the engine degrades them to a context-only
/// answer instead of propagating.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Incompatible index: {0}")]
    IncompatibleIndex(String),

    #[error("Embedding service failed: {0}")]
    EmbeddingService(String),
}

pub type Result<T> = std::result::Result<T, Error>;
