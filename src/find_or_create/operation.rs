//! The find-or-create orchestrator and its call builder.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::options::{FindOrCreateOptions, OptionsOverride};
use super::outcome::{Outcome, Resolution};
use crate::document::Document;
use crate::sanitize::sanitize;
use crate::schema::Schema;
use crate::store::DocumentStore;

/// Look up one document matching `query`, creating it if missing, and merge
/// `fields` into it.
///
/// At most one save is issued: never when a found document is left
/// unchanged, always when a document is created.
pub async fn find_or_create<S>(
    store: &S,
    schema: &Schema,
    query: &Map<String, Value>,
    fields: Option<&Map<String, Value>>,
    options: &FindOrCreateOptions,
) -> Outcome<S::Error>
where
    S: DocumentStore + ?Sized,
{
    let collection = schema.collection();

    let found = match store.find_one(schema, query).await {
        Ok(found) => found,
        Err(error) => {
            debug!(collection, %error, "find_or_create lookup failed");
            return Outcome::LookupFailed(error);
        }
    };

    let creating = found.is_none();
    let mut record = match found {
        Some(record) if fields.is_none() => {
            trace!(collection, id = %record.id(), "found, nothing to merge");
            return unchanged(record);
        }
        Some(record) => record,
        None => Document::new(sanitize(query)),
    };

    if !creating && !options.save_if_found {
        trace!(collection, id = %record.id(), "found, saveIfFound is off");
        return unchanged(record);
    }

    if let Some(fields) = fields {
        merge_fields(&mut record, fields, options.append_to_array);
    }

    if !creating && !record.is_modified() {
        trace!(collection, id = %record.id(), "found, merge changed nothing");
        return unchanged(record);
    }

    debug!(
        collection,
        id = %record.id(),
        is_new = creating,
        modified = ?record.modified_paths(),
        "find_or_create saving"
    );

    match store.save(schema, &mut record, &options.save_options).await {
        Ok(()) => Outcome::Settled {
            record,
            was_updated: true,
            is_new: creating,
        },
        Err(error) => {
            debug!(collection, id = %record.id(), %error, "find_or_create save failed");
            Outcome::SaveFailed {
                error,
                record,
                is_new: creating,
            }
        }
    }
}

fn unchanged<E>(record: Document) -> Outcome<E> {
    Outcome::Settled {
        record,
        was_updated: false,
        is_new: false,
    }
}

/// Set each field on the record. With `append_to_array`, a field that already
/// holds an array keeps its elements and gains the new ones after them.
pub(crate) fn merge_fields(record: &mut Document, fields: &Map<String, Value>, append_to_array: bool) {
    for (field, value) in fields {
        let merged = match record.get(field) {
            Some(Value::Array(existing)) if append_to_array => {
                let mut combined = existing.clone();
                match value {
                    Value::Array(items) => combined.extend(items.iter().cloned()),
                    other => combined.push(other.clone()),
                }
                Value::Array(combined)
            }
            _ => value.clone(),
        };
        record.set(field.as_str(), merged);
    }
}

/// A pending find-or-create call.
///
/// Built by [`Model::find_or_create`](crate::Model::find_or_create). Await
/// it for the full [`Outcome`], call [`resolve`](Self::resolve) for a plain
/// `Result`, or [`spawn`](Self::spawn) it with a completion handler.
#[must_use = "a find-or-create call does nothing until awaited or spawned"]
pub struct FindOrCreate<S> {
    store: S,
    schema: Arc<Schema>,
    query: Map<String, Value>,
    fields: Option<Map<String, Value>>,
    overrides: OptionsOverride,
}

impl<S> FindOrCreate<S>
where
    S: DocumentStore + 'static,
{
    pub(crate) fn new(store: S, schema: Arc<Schema>, query: Map<String, Value>) -> Self {
        Self {
            store,
            schema,
            query,
            fields: None,
            overrides: OptionsOverride::default(),
        }
    }

    /// Fields to merge into the found or created document.
    pub fn fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Per-call option overrides, applied over the schema defaults.
    pub fn options(mut self, overrides: OptionsOverride) -> Self {
        self.overrides = overrides;
        self
    }

    /// The options this call runs with: built-in, then schema, then per-call.
    pub fn effective_options(&self) -> FindOrCreateOptions {
        FindOrCreateOptions::resolve(self.schema.find_or_create_defaults(), &self.overrides)
    }

    /// Run the call and return the full outcome; the same as awaiting it.
    pub async fn execute(self) -> Outcome<S::Error> {
        let options = self.effective_options();
        find_or_create(
            &self.store,
            &self.schema,
            &self.query,
            self.fields.as_ref(),
            &options,
        )
        .await
    }

    /// Run the call and collapse its outcome: the record, or a
    /// [`Status`](super::Status) when the `status` option is set.
    pub async fn resolve(self) -> Result<Resolution, S::Error> {
        let status = self.effective_options().status;
        self.execute().await.resolve(status)
    }

    /// Run the call on the tokio runtime and hand the outcome to `callback`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, as [`tokio::spawn`] does.
    pub fn spawn<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Outcome<S::Error>) + Send + 'static,
    {
        tokio::spawn(async move { callback(self.execute().await) })
    }
}

impl<S> IntoFuture for FindOrCreate<S>
where
    S: DocumentStore + 'static,
{
    type Output = Outcome<S::Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
