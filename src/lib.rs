mod document;
mod find_or_create;
mod model;
mod sanitize;
mod schema;
mod store;

pub use document::{Document, ID_FIELD};
pub use find_or_create::{
    find_or_create, FindOrCreate, FindOrCreateOptions, OptionsOverride, Outcome, Resolution,
    Status,
};
pub use model::{Model, ModelsExt};
pub use sanitize::{sanitize, OPERATOR_PREFIX};
pub use schema::{FieldKind, FieldRule, FieldViolation, Schema, ValidationError};
pub use store::{matches_query, DocumentStore, InMemoryDocumentStore, SaveOptions, StoreError};
