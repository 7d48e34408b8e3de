//! Find-or-create - Look a document up by query, create it if missing, and
//! merge additional fields into it.
//!
//! ## Example
//!
//! ```ignore
//! use find_or_create::{InMemoryDocumentStore, ModelsExt, OptionsOverride, Schema};
//! use serde_json::json;
//!
//! let store = InMemoryDocumentStore::new();
//! let fruits = store.model(Schema::new("fruits"));
//!
//! // Await for the full outcome.
//! let outcome = fruits.find_or_create(query).fields(fields).await;
//! assert!(outcome.is_new());
//!
//! // Or resolve to a plain Result, shaped by the `status` option.
//! let fruit = fruits
//!     .find_or_create(query)
//!     .options(OptionsOverride::new().status(true))
//!     .resolve()
//!     .await?;
//!
//! // Or hand the outcome to a completion handler.
//! fruits.find_or_create(query).spawn(|outcome| println!("{:?}", outcome.record()));
//! ```
//!
//! Lookup and create are two separate store calls. Concurrent calls for the
//! same missing query may each create a document unless the store enforces
//! a unique field.

mod operation;
mod options;
mod outcome;

pub use operation::{find_or_create, FindOrCreate};
pub use options::{FindOrCreateOptions, OptionsOverride};
pub use outcome::{Outcome, Resolution, Status};
