//! Update request bodies and parameterised scripts.
//!
//! Field names and values are always bound as script parameters so that no
//! caller-controlled text ever becomes part of a script source.

use serde_json::{json, Value};

use crate::errors::SearchError;
use docsearch_shared::{Document, Script};

/// Writes `params.value` into the top-level field named by `params.field`.
const SET_FIELD_SOURCE: &str = "ctx._source[params.field] = params.value";

/// Removes the top-level field named by `params.field`, or reports a noop when
/// the field is absent.
const DELETE_FIELD_SOURCE: &str =
    "if (ctx._source.containsKey(params.field)) { ctx._source.remove(params.field) } else { ctx.op = 'noop' }";

/// Check that a field name is an identifier-safe token: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_field_name(field: &str) -> Result<(), SearchError> {
    let mut chars = field.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SearchError::invalid_request(format!(
            "field name '{}' is not an identifier-safe token",
            field
        )))
    }
}

/// Script setting a single field.
pub fn set_field_script(field: &str, value: Value) -> Script {
    Script::new(SET_FIELD_SOURCE)
        .param("field", field)
        .param("value", value)
}

/// Script removing a single field.
pub fn delete_field_script(field: &str) -> Script {
    Script::new(DELETE_FIELD_SOURCE).param("field", field)
}

fn script_value(script: &Script) -> Result<Value, SearchError> {
    serde_json::to_value(script)
        .map_err(|e| SearchError::serialization(format!("script: {}", e)))
}

/// Update body applying a script.
pub fn script_update_body(script: &Script) -> Result<Value, SearchError> {
    Ok(json!({ "script": script_value(script)? }))
}

/// Update body merging a partial document into the stored one.
pub fn partial_update_body(partial: &Document) -> Value {
    json!({ "doc": partial })
}

/// Update-by-query body: one script applied to every match of a query clause.
pub fn update_by_query_body(query: &Value, script: &Script) -> Result<Value, SearchError> {
    Ok(json!({
        "query": query,
        "script": script_value(script)?
    }))
}
