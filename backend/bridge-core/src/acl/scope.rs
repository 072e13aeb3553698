//! Heuristic scope-value extraction from request bodies.
//!
//! Scope values are pulled from well-known argument keys before the
//! permission check runs. The walk covers the body's top level and one
//! nested level of objects; string array values under the same keys are
//! flattened.

use serde_json::Value;

/// Argument keys whose values are treated as scopes.
const SCOPE_KEYS: &[&str] = &["path", "url", "file", "dir", "paths", "files", "dirs"];

/// Extract scope values from a parsed request body.
pub fn extract_scopes(body: &Value) -> Vec<String> {
    let mut scopes = Vec::new();
    let Value::Object(map) = body else {
        return scopes;
    };

    for (key, value) in map {
        collect_from_entry(key, value, &mut scopes);

        // One nested level: {"options": {"path": "..."}}.
        if let Value::Object(nested) = value {
            for (nested_key, nested_value) in nested {
                collect_from_entry(nested_key, nested_value, &mut scopes);
            }
        }
    }

    scopes
}

fn collect_from_entry(key: &str, value: &Value, scopes: &mut Vec<String>) {
    if !SCOPE_KEYS.contains(&key) {
        return;
    }

    match value {
        Value::String(s) => scopes.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                if let Value::String(s) = item {
                    scopes.push(s.clone());
                }
            }
        }
        _ => {}
    }
}
