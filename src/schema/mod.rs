//! Schema - Collection name, field rules, and registration defaults.
//!
//! A schema is what a model is bound to. Besides the field rules checked
//! before save, it carries the find-or-create defaults supplied once at
//! registration, which sit between the built-in defaults and per-call
//! overrides.
//!
//! ## Example
//!
//! ```ignore
//! use find_or_create::{FieldKind, FieldRule, OptionsOverride, Schema};
//!
//! let schema = Schema::new("fruits")
//!     .field("name", FieldRule::new(FieldKind::String).required())
//!     .field("tags", FieldRule::new(FieldKind::Array))
//!     .with_find_or_create(OptionsOverride::new().append_to_array(true));
//! ```

mod rule;

use std::collections::BTreeMap;

use crate::document::Document;
use crate::find_or_create::OptionsOverride;

pub use rule::{FieldKind, FieldRule, FieldViolation, ValidationError};

#[derive(Debug, Clone, Default)]
pub struct Schema {
    collection: String,
    fields: BTreeMap<String, FieldRule>,
    find_or_create: OptionsOverride,
}

impl Schema {
    /// The collection name maps to a table in SQL, a collection in MongoDB,
    /// or a key prefix in KV stores.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    /// Register schema-level find-or-create defaults.
    pub fn with_find_or_create(mut self, defaults: OptionsOverride) -> Self {
        self.find_or_create = defaults;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.get(field)
    }

    pub fn find_or_create_defaults(&self) -> &OptionsOverride {
        &self.find_or_create
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, rule)| rule.unique)
            .map(|(name, _)| name.as_str())
    }

    /// Check every field rule against the document.
    ///
    /// Fields without a rule are accepted as-is.
    pub fn validate(&self, document: &Document) -> Result<(), ValidationError> {
        let violations: Vec<FieldViolation> = self
            .fields
            .iter()
            .filter_map(|(field, rule)| {
                rule.check(document.get(field)).map(|reason| FieldViolation {
                    field: field.clone(),
                    reason,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                collection: self.collection.clone(),
                violations,
            })
        }
    }
}
