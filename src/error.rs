//! The closed error taxonomy shared by every component of the memory store.
//!
//! Every fallible operation in this crate returns [`MemoryError`] (via the
//! [`Result`] alias below) so that callers can match on `kind` rather than on
//! a boxed, unstructured error.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// The closed set of failure kinds a memory store operation can produce.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Caller-supplied input failed a basic validation rule (empty content,
    /// empty query, neither/both of `memory_id`/`content_hash` supplied, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A `priority` token outside `{CORE, HIGH, NORMAL, LOW}` was supplied
    /// where an input is being strictly validated (as opposed to scored,
    /// where unknown priorities default to 0.5 rather than erroring).
    #[error("invalid priority: {0:?}")]
    InvalidPriority(String),

    /// An embedding's length did not match the store's configured dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Insertion was attempted with a `content_hash` that already exists.
    #[error("duplicate content hash: {0}")]
    DuplicateHash(String),

    /// Lookup by id or hash found nothing.
    #[error("not found")]
    NotFound,

    /// The persistent store could not service the request (I/O error, schema
    /// error, lock contention exhausted its retry budget).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The embedding model failed to produce a vector for non-empty input.
    #[error("embedding model error: {0}")]
    ModelError(String),

    /// Anything else unexpected: corrupt rows, unparseable JSON columns, and
    /// so on. Internal errors are logged and, where possible, the offending
    /// row is skipped rather than failing an entire list/search call.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for MemoryError {
    fn from(err: rusqlite::Error) -> Self {
        MemoryError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        MemoryError::Internal(format!("json error: {err}"))
    }
}
