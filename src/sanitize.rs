//! Query sanitizing for create-on-miss.
//!
//! A lookup query may carry operator clauses (`{color: {$exists: true}}`)
//! that mean nothing as initial field values. Before a query seeds a new
//! document, operator keys are dropped, and so is any key whose nested
//! object holds nothing but operators.

use serde_json::{Map, Value};

/// Prefix marking query operator keys.
pub const OPERATOR_PREFIX: char = '$';

/// Strip operator keys and operator-only sub-objects from `query`.
///
/// Surviving keys keep their original value; the sanitized sub-value only
/// decides whether a key survives. Arrays and scalars are never descended into.
pub fn sanitize(query: &Map<String, Value>) -> Map<String, Value> {
    query
        .iter()
        .filter(|(key, _)| !key.starts_with(OPERATOR_PREFIX))
        .filter(|(_, value)| match value {
            Value::Object(nested) => !sanitize(nested).is_empty(),
            _ => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
