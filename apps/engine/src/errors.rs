use thiserror::Error;

/// Engine-level error type. Only `EmptyDocument` is terminal for a parse
/// request; every other degraded condition is carried as a flag on the
/// `ParseReport` instead of surfacing here.
///
/// Decode failures belong to the upstream format-decoding collaborator
/// and must be reported to the caller before the engine is invoked.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("empty document: normalized text contains no content")]
    EmptyDocument,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
