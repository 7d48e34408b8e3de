//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::trace;

use super::query::{check_query, matches_query};
use super::{DocumentStore, SaveOptions, StoreError};
use crate::document::{Document, ID_FIELD};
use crate::schema::Schema;

/// Internal stored representation of a document.
struct StoredDocument {
    bytes: Vec<u8>,
    version: u64,
    /// Insertion order, so lookups return the oldest match first.
    seq: u64,
}

#[derive(Default)]
struct Collections {
    documents: HashMap<String, StoredDocument>,
    next_seq: u64,
}

/// In-memory document store backed by a HashMap.
///
/// Storage key is `"collection:_id"`. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are keyed by their JSON text, so `42` and `"42"` stay distinct.
    fn make_key(collection: &str, id: &Value) -> String {
        format!("{}:{}", collection, id)
    }

    fn decode(stored: &StoredDocument) -> Result<Document, StoreError> {
        let mut fields: Map<String, Value> =
            serde_json::from_slice(&stored.bytes).map_err(|e| StoreError::Serde(e.to_string()))?;

        let id = match fields.remove(ID_FIELD) {
            Some(id) if !id.is_null() => id,
            _ => return Err(StoreError::Serde("stored document has no _id".into())),
        };

        Ok(Document::hydrate(id, fields, stored.version))
    }

    /// Every document in the schema's collection, oldest first.
    pub fn all(&self, schema: &Schema) -> Result<Vec<Document>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}:", schema.collection());
        let mut stored: Vec<&StoredDocument> = storage
            .documents
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, stored)| stored)
            .collect();
        stored.sort_by_key(|s| s.seq);

        stored.into_iter().map(Self::decode).collect()
    }

    /// Number of documents in the schema's collection.
    pub fn count(&self, schema: &Schema) -> Result<usize, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}:", schema.collection());
        Ok(storage
            .documents
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .count())
    }

    /// Get a document by id. Returns None if not found.
    pub fn get(&self, schema: &Schema, id: &Value) -> Result<Option<Document>, StoreError> {
        let key = Self::make_key(schema.collection(), id);
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        storage.documents.get(&key).map(Self::decode).transpose()
    }

    fn lookup(
        &self,
        schema: &Schema,
        query: &Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        check_query(query)?;

        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}:", schema.collection());
        let mut best: Option<&StoredDocument> = None;

        for (key, stored) in storage.documents.iter() {
            if !key.starts_with(&prefix) {
                continue;
            }
            if best.map_or(false, |b| b.seq < stored.seq) {
                continue;
            }
            let value: Value = serde_json::from_slice(&stored.bytes)
                .map_err(|e| StoreError::Serde(e.to_string()))?;
            if matches_query(&value, query)? {
                best = Some(stored);
            }
        }

        best.map(Self::decode).transpose()
    }

    fn write(
        &self,
        schema: &Schema,
        document: &mut Document,
        options: &SaveOptions,
    ) -> Result<u64, StoreError> {
        if options.validate_before_save() {
            schema.validate(document)?;
        }

        let collection = schema.collection();
        let key = Self::make_key(collection, document.id());
        let bytes = serde_json::to_vec(&document.to_value())
            .map_err(|e| StoreError::Serde(e.to_string()))?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        Self::check_unique(&storage, schema, &key, document)?;

        let existing = storage.documents.get(&key).map(|s| (s.version, s.seq));

        let (version, seq) = match (document.is_new(), existing) {
            (true, Some((actual, _))) => {
                return Err(StoreError::ConcurrencyConflict {
                    collection: collection.to_string(),
                    id: document.id().to_string(),
                    expected: 0,
                    actual,
                })
            }
            (true, None) => {
                let seq = storage.next_seq;
                storage.next_seq += 1;
                (1, seq)
            }
            (false, None) => {
                return Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id: document.id().to_string(),
                })
            }
            (false, Some((actual, _))) if actual != document.version() => {
                return Err(StoreError::ConcurrencyConflict {
                    collection: collection.to_string(),
                    id: document.id().to_string(),
                    expected: document.version(),
                    actual,
                })
            }
            (false, Some((actual, seq))) => (actual + 1, seq),
        };

        storage.documents.insert(
            key,
            StoredDocument {
                bytes,
                version,
                seq,
            },
        );

        Ok(version)
    }

    fn check_unique(
        storage: &Collections,
        schema: &Schema,
        key: &str,
        document: &Document,
    ) -> Result<(), StoreError> {
        let prefix = format!("{}:", schema.collection());

        for field in schema.unique_fields() {
            let value = match document.get(field) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };

            for (other_key, stored) in storage.documents.iter() {
                if other_key == key || !other_key.starts_with(&prefix) {
                    continue;
                }
                let other = Self::decode(stored)?;
                if other.get(field) == Some(value) {
                    return Err(StoreError::DuplicateKey {
                        collection: schema.collection().to_string(),
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    type Error = StoreError;

    async fn find_one(
        &self,
        schema: &Schema,
        query: &Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        let found = self.lookup(schema, query)?;
        trace!(
            collection = schema.collection(),
            found = found.is_some(),
            "in-memory lookup"
        );
        Ok(found)
    }

    async fn save(
        &self,
        schema: &Schema,
        document: &mut Document,
        options: &SaveOptions,
    ) -> Result<(), StoreError> {
        let version = self.write(schema, document, options)?;
        document.mark_persisted(version);
        trace!(
            collection = schema.collection(),
            id = %document.id(),
            version,
            "in-memory save"
        );
        Ok(())
    }
}
