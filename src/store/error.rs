use thiserror::Error;

use crate::schema::ValidationError;

/// Error type for the in-memory document store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The document failed its schema's field rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A unique field already holds this value in another document.
    #[error("duplicate key on {collection}.{field}: {value}")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },
    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on {collection}:{id} (expected version {expected}, actual {actual})")]
    ConcurrencyConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// A loaded document disappeared before it was written back.
    #[error("document not found: {collection}:{id}")]
    NotFound { collection: String, id: String },
    /// The query used an unsupported operator or a malformed clause.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// Serialization/deserialization error.
    #[error("document serialization error: {0}")]
    Serde(String),
    /// Storage-level error.
    #[error("document storage error: {0}")]
    Storage(String),
}
