//! Document - In-memory representation of a stored record.
//!
//! A document carries its field map, the snapshot of what was last persisted,
//! and the store version of that snapshot. Change tracking compares the two,
//! so writing a field back to the value it already had is not a modification.

use serde_json::{Map, Value};
use tracing::trace;
use uuid::Uuid;

/// Name of the identity field in stored and rendered documents.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: Value,
    fields: Map<String, Value>,
    persisted: Option<Map<String, Value>>,
    version: u64,
}

impl Document {
    /// Construct a new, unsaved document from seed fields.
    ///
    /// Dotted seed keys such as `"origin.country"` become nested objects, so
    /// the document matches the query path it was seeded from. A non-null
    /// `_id` in the seed (string, number or any other JSON value) becomes the
    /// identity; otherwise a fresh UUID string is assigned.
    pub fn new(seed: Map<String, Value>) -> Self {
        let mut fields = expand_paths(seed);
        let id = match fields.remove(ID_FIELD) {
            Some(id) if !id.is_null() => id,
            _ => Value::String(Uuid::new_v4().to_string()),
        };

        Self {
            id,
            fields,
            persisted: None,
            version: 0,
        }
    }

    /// Rebuild a document that was loaded from storage at `version`.
    pub fn hydrate(id: impl Into<Value>, fields: Map<String, Value>, version: u64) -> Self {
        Self {
            id: id.into(),
            persisted: Some(fields.clone()),
            fields,
            version,
        }
    }

    /// The identity, exactly as it appears under `_id`.
    pub fn id(&self) -> &Value {
        &self.id
    }

    /// Store version of the last persisted state; 0 for unsaved documents.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True until the document has been saved once.
    pub fn is_new(&self) -> bool {
        self.persisted.is_none()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        if field == ID_FIELD {
            return None;
        }
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Set a field in memory. The identity is immutable, so `_id` is ignored.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        if field == ID_FIELD {
            trace!(id = %self.id, "ignoring write to _id");
            return;
        }
        self.fields.insert(field, value);
    }

    /// Whether any field differs from the last persisted state.
    pub fn is_modified(&self) -> bool {
        match &self.persisted {
            Some(persisted) => persisted != &self.fields,
            None => !self.fields.is_empty(),
        }
    }

    /// Sorted names of the fields that differ from the last persisted state.
    pub fn modified_paths(&self) -> Vec<String> {
        let empty = Map::new();
        let persisted = self.persisted.as_ref().unwrap_or(&empty);

        let mut paths: Vec<String> = self
            .fields
            .keys()
            .chain(persisted.keys())
            .filter(|key| self.fields.get(*key) != persisted.get(*key))
            .cloned()
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Called by a store once the current fields have been written at `version`.
    pub fn mark_persisted(&mut self, version: u64) {
        self.persisted = Some(self.fields.clone());
        self.version = version;
    }

    /// Render as a JSON object including `_id`.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(ID_FIELD.to_string(), self.id.clone());
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// Turn `"a.b": v` entries into `{"a": {"b": v}}`, merging into objects that
/// are already present. Keys with an empty segment are kept as written.
fn expand_paths(seed: Map<String, Value>) -> Map<String, Value> {
    let mut expanded = Map::with_capacity(seed.len());

    for (key, value) in seed {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            insert_merged(&mut expanded, key.clone(), value);
        } else {
            insert_path(&mut expanded, &segments, value);
        }
    }

    expanded
}

fn insert_path(target: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => insert_merged(target, last.to_string(), value),
        [head, rest @ ..] => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = slot {
                insert_path(child, rest, value);
                return;
            }
            // A scalar sits where the path needs an object.
            let mut child = Map::new();
            insert_path(&mut child, rest, value);
            *slot = Value::Object(child);
        }
    }
}

/// Insert `value`, folding object values into an object already at `key`.
fn insert_merged(target: &mut Map<String, Value>, key: String, value: Value) {
    if let Value::Object(incoming) = value {
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            for (k, v) in incoming {
                insert_merged(existing, k, v);
            }
            return;
        }
        target.insert(key, Value::Object(incoming));
        return;
    }
    target.insert(key, value);
}
