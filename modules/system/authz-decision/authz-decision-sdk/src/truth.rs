//! Truthiness of PDP literal results.

use serde_json::Value;

/// Whether a literal PDP result means "allowed".
///
/// Accepted encodings of true:
/// - `true`
/// - a singleton array whose element is itself true-equivalent (`[true]`)
/// - an OPA boolean term, `{"type": "boolean", "value": true}`
///
/// Anything else, including truthy-looking strings and numbers, is
/// false-equivalent. The function is total and has no side effects.
#[must_use]
pub fn is_true_equivalent(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Array(items) => match items.as_slice() {
            [single] => is_true_equivalent(single),
            _ => false,
        },
        Value::Object(term) => {
            term.get("type").and_then(Value::as_str) == Some("boolean")
                && term.get("value").and_then(Value::as_bool) == Some(true)
        }
        Value::Null | Value::Number(_) | Value::String(_) => false,
    }
}
