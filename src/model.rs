//! Model - A document store bound to a schema.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::document::Document;
use crate::find_or_create::FindOrCreate;
use crate::schema::Schema;
use crate::store::{DocumentStore, SaveOptions};

/// Typed handle for one collection of a store.
///
/// Cloning is cheap when the store is (the schema is shared).
#[derive(Clone)]
pub struct Model<S> {
    store: S,
    schema: Arc<Schema>,
}

impl<S> Model<S>
where
    S: DocumentStore + Clone + 'static,
{
    pub fn new(store: S, schema: Schema) -> Self {
        Self {
            store,
            schema: Arc::new(schema),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Find the first document matching `query`.
    pub async fn find_one(&self, query: &Map<String, Value>) -> Result<Option<Document>, S::Error> {
        self.store.find_one(&self.schema, query).await
    }

    /// Construct an unsaved document from seed fields.
    pub fn create(&self, seed: Map<String, Value>) -> Document {
        Document::new(seed)
    }

    pub async fn save(&self, document: &mut Document, options: &SaveOptions) -> Result<(), S::Error> {
        self.store.save(&self.schema, document, options).await
    }

    /// Start a find-or-create call for `query`.
    pub fn find_or_create(&self, query: Map<String, Value>) -> FindOrCreate<S> {
        FindOrCreate::new(self.store.clone(), Arc::clone(&self.schema), query)
    }
}

/// Extension trait for binding any cloneable DocumentStore to a schema.
pub trait ModelsExt: DocumentStore + Clone + Sized + 'static {
    fn model(&self, schema: Schema) -> Model<Self> {
        Model::new(self.clone(), schema)
    }
}

impl<S: DocumentStore + Clone + 'static> ModelsExt for S {}
