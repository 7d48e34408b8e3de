//! find-or-create integration tests against a fruit collection.

mod support;
mod options;
mod errors;
