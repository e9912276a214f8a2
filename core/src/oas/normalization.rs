#![deny(missing_docs)]

//! # OpenAPI Normalization
//!
//! Raw-value rewrites applied to every loaded document before schemas are
//! parsed into `SchemaNode`s. They fold version-specific spellings of the same
//! keyword into the shape the schema parser reads:
//!
//! - Swagger 2.0 `x-nullable` becomes `nullable`.
//! - `const` becomes a single-value `enum` (with an inferred `type`).
//! - OAS 3.0 boolean `exclusiveMinimum`/`exclusiveMaximum` become the 3.1 numeric form.
//!
//! Literal payloads (`example`, `examples`, `default`, `enum`) are never rewritten.

use serde_json::{Map, Value};

/// Applies every raw rewrite to a document in place.
pub(crate) fn normalize_document(value: &mut Value) {
    normalize_nullable_flags(value);
    normalize_const_schemas(value);
    normalize_exclusive_bounds(value);
}

/// Normalizes Swagger 2.0 `x-nullable: true` into the OAS 3.0 `nullable: true` flag.
///
/// OAS 3.1 `type: [T, "null"]` unions are handled by the schema parser directly.
pub(crate) fn normalize_nullable_flags(value: &mut Value) {
    walk_schema_objects(value, &mut |map| {
        if let Some(flag) = map.remove("x-nullable") {
            if !map.contains_key("nullable") {
                map.insert("nullable".to_string(), flag);
            }
        }
    });
}

/// Normalizes JSON Schema `const` usage into single-value `enum` entries.
///
/// This is scoped to schema objects to preserve compatibility with parsers that
/// do not yet recognize the `const` keyword.
pub(crate) fn normalize_const_schemas(value: &mut Value) {
    walk_schema_objects(value, &mut |map| {
        if let Some(const_val) = map.remove("const") {
            if !map.contains_key("enum") {
                map.insert("enum".to_string(), Value::Array(vec![const_val.clone()]));
            }
            if !map.contains_key("type") {
                if let Some(type_name) = infer_schema_type(&const_val) {
                    map.insert("type".to_string(), Value::String(type_name));
                }
            }
        }
    });
}

/// Rewrites OAS 3.0 `exclusiveMinimum: true` (paired with `minimum`) into the
/// numeric OAS 3.1 form `exclusiveMinimum: <minimum>`; same for the maximum.
/// `exclusiveMinimum: false` is dropped.
pub(crate) fn normalize_exclusive_bounds(value: &mut Value) {
    walk_schema_objects(value, &mut |map| {
        rewrite_exclusive(map, "exclusiveMinimum", "minimum");
        rewrite_exclusive(map, "exclusiveMaximum", "maximum");
    });
}

fn rewrite_exclusive(map: &mut Map<String, Value>, exclusive_key: &str, bound_key: &str) {
    let Some(Value::Bool(flag)) = map.get(exclusive_key) else {
        return;
    };
    let replacement = if *flag { map.get(bound_key).cloned() } else { None };
    match replacement {
        Some(bound) => {
            map.insert(exclusive_key.to_string(), bound);
        }
        None => {
            map.remove(exclusive_key);
        }
    }
}

fn infer_schema_type(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => Some("string".to_string()),
        Value::Bool(_) => Some("boolean".to_string()),
        Value::Number(num) => {
            if num.is_i64() || num.is_u64() {
                Some("integer".to_string())
            } else {
                Some("number".to_string())
            }
        }
        Value::Array(_) => Some("array".to_string()),
        Value::Object(_) => Some("object".to_string()),
        Value::Null => Some("null".to_string()),
    }
}

/// Visits every object in the tree, skipping literal payload keys.
fn walk_schema_objects<F>(value: &mut Value, visit: &mut F)
where
    F: FnMut(&mut Map<String, Value>),
{
    match value {
        Value::Object(map) => {
            visit(map);
            for (key, v) in map.iter_mut() {
                if matches!(key.as_str(), "example" | "examples" | "default" | "enum") {
                    continue;
                }
                walk_schema_objects(v, visit);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                walk_schema_objects(v, visit);
            }
        }
        _ => {}
    }
}
