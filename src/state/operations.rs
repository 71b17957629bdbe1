//! Shallow merge application.
//!
//! The merge is strictly top-level: a key present in the partial replaces
//! its value wholesale, a key absent from the partial is left untouched,
//! however deeply nested its value may be.

use crate::error::{Result, StateError};
use crate::types::AppState;
use serde_json::Value;

/// Compute `{ ...current, ...partial }` over two JSON objects.
///
/// Returns a new state; neither input is mutated.
pub fn shallow_merge(current: &AppState, partial: &AppState) -> AppState {
    let mut merged = current.clone();
    for (key, value) in partial {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Require a value to be a JSON object, yielding its map.
///
/// Used to validate both the initial state and every partial update.
/// The error names the offending value's type.
pub fn as_object(value: Value, err: fn(String) -> StateError) -> Result<AppState> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(err(value_type_name(&other).to_string())),
    }
}

/// Top-level keys a partial update touches, in the partial's key order.
pub fn touched_keys(partial: &AppState) -> Vec<String> {
    partial.keys().cloned().collect()
}

/// Human-readable JSON type name, for error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> AppState {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_overwrites_matching_keys() {
        let current = obj(json!({"count": 0, "name": "test"}));
        let partial = obj(json!({"count": 5}));

        let merged = shallow_merge(&current, &partial);
        assert_eq!(merged["count"], 5);
        assert_eq!(merged["name"], "test");
    }

    #[test]
    fn test_merge_adds_new_keys() {
        let current = obj(json!({"count": 0}));
        let partial = obj(json!({"extra": true}));

        let merged = shallow_merge(&current, &partial);
        assert_eq!(merged["count"], 0);
        assert_eq!(merged["extra"], true);
    }

    #[test]
    fn test_merge_replaces_nested_values_wholesale() {
        let current = obj(json!({"stable": {"blank": "blank", "kept": 1}}));
        let partial = obj(json!({"stable": {"changed": "changed"}}));

        let merged = shallow_merge(&current, &partial);
        // No field-level merging below the top level.
        assert_eq!(merged["stable"], json!({"changed": "changed"}));
    }

    #[test]
    fn test_merge_leaves_omitted_nested_values_identical() {
        let current = obj(json!({"count": 0, "stable": {"blank": "blank"}}));
        let partial = obj(json!({"count": 1}));

        let merged = shallow_merge(&current, &partial);
        assert_eq!(merged["stable"], current["stable"]);
    }

    #[test]
    fn test_merge_empty_partial_is_identity() {
        let current = obj(json!({"a": 1, "b": [1, 2, 3]}));
        let partial = obj(json!({}));

        let merged = shallow_merge(&current, &partial);
        assert_eq!(Value::Object(merged), Value::Object(current));
    }

    #[test]
    fn test_merge_fold_in_call_order() {
        // state = initial ⊕ u1 ⊕ u2 ⊕ u3, keys colliding left-to-right
        let initial = obj(json!({"a": 0, "b": 0}));
        let updates = [
            obj(json!({"a": 1})),
            obj(json!({"b": 2, "c": 2})),
            obj(json!({"a": 3})),
        ];

        let merged = updates
            .iter()
            .fold(initial, |state, update| shallow_merge(&state, update));

        assert_eq!(Value::Object(merged), json!({"a": 3, "b": 2, "c": 2}));
    }

    #[test]
    fn test_as_object_rejects_non_objects() {
        let result = as_object(json!([1, 2]), StateError::InvalidPartial);
        assert!(matches!(result, Err(StateError::InvalidPartial(ref t)) if t == "array"));

        let result = as_object(json!(42), StateError::InvalidState);
        assert!(matches!(result, Err(StateError::InvalidState(ref t)) if t == "number"));
    }

    #[test]
    fn test_touched_keys() {
        let partial = obj(json!({"count": 1, "stable": {}}));
        assert_eq!(touched_keys(&partial), vec!["count", "stable"]);
    }
}
