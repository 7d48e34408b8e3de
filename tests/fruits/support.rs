//! Shared fixtures: the fruit schema and store wrappers that count, fail, or
//! hold calls at a barrier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use find_or_create::{
    Document, DocumentStore, FieldKind, FieldRule, InMemoryDocumentStore, SaveOptions, Schema,
    StoreError,
};
use serde_json::{Map, Value};
use tokio::sync::Barrier;

pub fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

pub fn fruits() -> Schema {
    Schema::new("fruits")
        .field("name", FieldRule::new(FieldKind::String))
        .field("color", FieldRule::new(FieldKind::String))
        .field("tags", FieldRule::new(FieldKind::Array))
}

/// Fruit schema whose `color` only accepts a fixed palette.
pub fn strict_fruits() -> Schema {
    Schema::new("fruits")
        .field("name", FieldRule::new(FieldKind::String).required())
        .field(
            "color",
            FieldRule::new(FieldKind::String).allowed(["red", "green", "yellow"]),
        )
}

/// In-memory store that counts lookups and saves.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: InMemoryDocumentStore,
    lookups: Arc<AtomicUsize>,
    saves: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    type Error = StoreError;

    async fn find_one(
        &self,
        schema: &Schema,
        query: &Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_one(schema, query).await
    }

    async fn save(
        &self,
        schema: &Schema,
        document: &mut Document,
        options: &SaveOptions,
    ) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(schema, document, options).await
    }
}

/// Store whose lookups always fail.
#[derive(Clone, Default)]
pub struct BrokenLookupStore {
    saves: Arc<AtomicUsize>,
}

impl BrokenLookupStore {
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for BrokenLookupStore {
    type Error = StoreError;

    async fn find_one(
        &self,
        _schema: &Schema,
        _query: &Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Storage("connection refused".into()))
    }

    async fn save(
        &self,
        _schema: &Schema,
        _document: &mut Document,
        _options: &SaveOptions,
    ) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store that makes every lookup wait until `parties` lookups have completed,
/// so concurrent callers all observe the same pre-save state.
#[derive(Clone)]
pub struct GatedStore {
    pub inner: InMemoryDocumentStore,
    barrier: Arc<Barrier>,
}

impl GatedStore {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            barrier: Arc::new(Barrier::new(parties)),
        }
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    type Error = StoreError;

    async fn find_one(
        &self,
        schema: &Schema,
        query: &Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        let found = self.inner.find_one(schema, query).await;
        self.barrier.wait().await;
        found
    }

    async fn save(
        &self,
        schema: &Schema,
        document: &mut Document,
        options: &SaveOptions,
    ) -> Result<(), StoreError> {
        self.inner.save(schema, document, options).await
    }
}
