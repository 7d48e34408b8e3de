//! DocumentStore - The persistence collaborator behind find-or-create.
//!
//! The orchestrator only needs two capabilities from a store: look up one
//! document by query, and save a document. Everything else (connections,
//! indexes, retries, timeouts) belongs to the implementation.

mod error;
mod in_memory;
mod query;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::schema::Schema;

pub use error::StoreError;
pub use in_memory::InMemoryDocumentStore;
pub use query::matches_query;

/// Async single-document storage for schema-bound collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Find the first document in the schema's collection matching `query`.
    async fn find_one(
        &self,
        schema: &Schema,
        query: &Map<String, Value>,
    ) -> Result<Option<Document>, Self::Error>;

    /// Insert a new document or write back a loaded one.
    ///
    /// On success the store calls [`Document::mark_persisted`].
    async fn save(
        &self,
        schema: &Schema,
        document: &mut Document,
        options: &SaveOptions,
    ) -> Result<(), Self::Error>;
}

/// Options handed verbatim to [`DocumentStore::save`].
///
/// The map is opaque to find-or-create; each store decides which keys it
/// understands. The in-memory store reads `validateBeforeSave`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveOptions(Map<String, Value>);

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Validation runs unless `validateBeforeSave` is explicitly `false`.
    pub fn validate_before_save(&self) -> bool {
        !matches!(self.0.get("validateBeforeSave"), Some(Value::Bool(false)))
    }
}

impl From<Map<String, Value>> for SaveOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
