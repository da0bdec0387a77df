//! Flattening of YANG-shaped JSON trees into per-leaf records
//!
//! A JSON payload returned by a device nests containers (objects) and lists
//! (arrays of objects). List keys sit next to ordinary leaves at the same
//! level, so the walk promotes every leaf whose name is a known key into the
//! key context of its siblings and descendants instead of emitting it.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One terminal value with its relative path and the keys above it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatLeafRecord {
    pub keys: Map<String, Value>,
    pub yang_path: String,
    pub value: Value,
}

/// Flatten a JSON payload into leaf records
///
/// `value` must be an object, or an array of objects as returned by some
/// devices for multi-entry updates. `keys` seeds the key context, usually
/// with the predicates of the update path.
pub fn flatten(
    keywords: &HashSet<String>,
    value: &Value,
    keys: &Map<String, Value>,
) -> Result<Vec<FlatLeafRecord>> {
    let mut leaves = Vec::new();
    let mut prefix = Vec::new();

    match value {
        Value::Object(fields) => {
            walk_fields(&mut prefix, fields, keywords, keys.clone(), &mut leaves);
        }
        Value::Array(items) => {
            for item in items {
                let fields = item.as_object().ok_or_else(|| {
                    Error::UnsupportedEncoding(format!("list entry is not an object: {item}"))
                })?;
                walk_fields(&mut prefix, fields, keywords, keys.clone(), &mut leaves);
            }
        }
        other => {
            return Err(Error::UnsupportedEncoding(format!(
                "JSON payload is a bare scalar: {other}"
            )))
        }
    }

    Ok(leaves)
}

/// Walk the fields of one object sharing a single key context
///
/// Keys found among the fields are visible to the fields after them and to
/// everything below those fields, never to the object's own siblings.
fn walk_fields<'v>(
    prefix: &mut Vec<&'v str>,
    fields: &'v Map<String, Value>,
    keywords: &HashSet<String>,
    mut keys: Map<String, Value>,
    leaves: &mut Vec<FlatLeafRecord>,
) {
    for (name, value) in fields {
        walk(prefix, name, value, keywords, &mut keys, leaves);
    }
}

fn walk<'v>(
    prefix: &mut Vec<&'v str>,
    name: &'v str,
    value: &'v Value,
    keywords: &HashSet<String>,
    keys: &mut Map<String, Value>,
    leaves: &mut Vec<FlatLeafRecord>,
) {
    match value {
        Value::Object(fields) => {
            prefix.push(name);
            walk_fields(prefix, fields, keywords, keys.clone(), leaves);
            prefix.pop();
        }
        Value::Array(items) => {
            prefix.push(name);
            for item in items {
                match item {
                    Value::Object(fields) => {
                        walk_fields(prefix, fields, keywords, keys.clone(), leaves)
                    }
                    scalar => leaves.push(FlatLeafRecord {
                        keys: keys.clone(),
                        yang_path: prefix.join("/"),
                        value: scalar.clone(),
                    }),
                }
            }
            prefix.pop();
        }
        scalar if keywords.contains(name) => {
            keys.insert(name.to_string(), scalar.clone());
        }
        scalar => {
            prefix.push(name);
            leaves.push(FlatLeafRecord {
                keys: keys.clone(),
                yang_path: prefix.join("/"),
                value: scalar.clone(),
            });
            prefix.pop();
        }
    }
}
