use thiserror::Error;

/// Errors produced by document lookups and primitive transforms.
///
/// Expected no-op conditions (a lookup that finds nothing, an operation on
/// a suggestion that was already resolved) are reported through `Option` and
/// `bool` returns instead; these variants indicate a caller handed the
/// engine a position that does not exist.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("path does not resolve to a node")]
    PathNotFound,
    #[error("path does not point to a text leaf")]
    NotAText,
    #[error("path does not point to an element")]
    NotAnElement,
    #[error("offset {offset} out of bounds for leaf of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("document (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}
