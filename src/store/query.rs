//! Mongo-style query matching over JSON documents.
//!
//! Supported: literal equality (an array field matches when any element
//! equals a scalar literal), dot paths, the field operators `$eq $ne $gt
//! $gte $lt $lte $in $nin $exists`, and the top-level combinators `$and
//! $or $nor`.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::StoreError;

/// Whether `document` (a JSON object, `_id` included) satisfies `query`.
pub fn matches_query(document: &Value, query: &Map<String, Value>) -> Result<bool, StoreError> {
    for (key, condition) in query {
        let matched = match key.as_str() {
            "$and" => every_clause(document, key, condition)?,
            "$or" => any_clause(document, key, condition)?,
            "$nor" => !any_clause(document, key, condition)?,
            op if op.starts_with('$') => {
                return Err(StoreError::InvalidQuery(format!(
                    "unknown top-level operator {}",
                    op
                )))
            }
            path => matches_condition(resolve(document, path), condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Reject unsupported operators and malformed clauses before any document
/// is examined.
pub(crate) fn check_query(query: &Map<String, Value>) -> Result<(), StoreError> {
    for (key, condition) in query {
        match key.as_str() {
            "$and" | "$or" | "$nor" => {
                for clause in clauses(key, condition)? {
                    check_query(clause)?;
                }
            }
            op if op.starts_with('$') => {
                return Err(StoreError::InvalidQuery(format!(
                    "unknown top-level operator {}",
                    op
                )))
            }
            _ => {
                let operators = match is_operator_object(condition) {
                    Some(operators) => operators,
                    None => continue,
                };
                for (op, operand) in operators {
                    match op.as_str() {
                        "$in" | "$nin" if !operand.is_array() => {
                            return Err(StoreError::InvalidQuery(format!("{} expects an array", op)))
                        }
                        "$eq" | "$ne" | "$gt" | "$gte" | "$lt" | "$lte" | "$in" | "$nin"
                        | "$exists" => {}
                        other => {
                            return Err(StoreError::InvalidQuery(format!(
                                "unknown field operator {}",
                                other
                            )))
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn clauses<'a>(key: &str, condition: &'a Value) -> Result<Vec<&'a Map<String, Value>>, StoreError> {
    let items = condition
        .as_array()
        .ok_or_else(|| StoreError::InvalidQuery(format!("{} expects an array", key)))?;

    items
        .iter()
        .map(|item| {
            item.as_object()
                .ok_or_else(|| StoreError::InvalidQuery(format!("{} clauses must be objects", key)))
        })
        .collect()
}

fn every_clause(document: &Value, key: &str, condition: &Value) -> Result<bool, StoreError> {
    for clause in clauses(key, condition)? {
        if !matches_query(document, clause)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_clause(document: &Value, key: &str, condition: &Value) -> Result<bool, StoreError> {
    for clause in clauses(key, condition)? {
        if matches_query(document, clause)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Follow a dot path through objects and array indexes.
fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_operator_object(condition: &Value) -> Option<&Map<String, Value>> {
    match condition {
        Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => {
            Some(map)
        }
        _ => None,
    }
}

fn matches_condition(actual: Option<&Value>, condition: &Value) -> Result<bool, StoreError> {
    let operators = match is_operator_object(condition) {
        Some(operators) => operators,
        None => return Ok(equals(actual, condition)),
    };

    for (op, operand) in operators {
        let matched = match op.as_str() {
            "$eq" => equals(actual, operand),
            "$ne" => !equals(actual, operand),
            "$gt" => compares(actual, operand, |o| o == Ordering::Greater),
            "$gte" => compares(actual, operand, |o| o != Ordering::Less),
            "$lt" => compares(actual, operand, |o| o == Ordering::Less),
            "$lte" => compares(actual, operand, |o| o != Ordering::Greater),
            "$in" => within(actual, op, operand)?,
            "$nin" => !within(actual, op, operand)?,
            "$exists" => actual.is_some() == truthy(operand),
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "unknown field operator {}",
                    other
                )))
            }
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// A missing field equals `null`; an array equals a scalar it contains.
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(value) if value == expected => true,
        Some(Value::Array(items)) => items.contains(expected),
        Some(_) => false,
    }
}

fn compares(actual: Option<&Value>, operand: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    match actual {
        None => false,
        Some(Value::Array(items)) if !operand.is_array() => items
            .iter()
            .any(|item| compare(item, operand).map_or(false, &accept)),
        Some(value) => compare(value, operand).map_or(false, &accept),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn within(actual: Option<&Value>, op: &str, operand: &Value) -> Result<bool, StoreError> {
    let candidates = operand
        .as_array()
        .ok_or_else(|| StoreError::InvalidQuery(format!("{} expects an array", op)))?;
    Ok(candidates.iter().any(|candidate| equals(actual, candidate)))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
