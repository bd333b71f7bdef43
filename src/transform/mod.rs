//! Normalizers from raw MyGene gene records into stable per-domain shapes.

use serde_json::Value;

pub(crate) mod chemical;
pub(crate) mod disease;
pub(crate) mod expression;
pub(crate) mod go;
pub(crate) mod homology;
pub(crate) mod pathway;
pub(crate) mod variant;

/// Coerces a field that upstream returns as either one object or a list.
///
/// `null` becomes an empty list, an array yields its elements, anything else
/// yields a one-element list. Applying it to its own output is a no-op.
pub(crate) fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Owned variant of [`as_list`].
pub(crate) fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Cloned value of `key`, or `null` when `value` is not an object or lacks it.
pub(crate) fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

/// Like [`field`] but substitutes `default` for a missing key.
pub(crate) fn field_or(value: &Value, key: &str, default: Value) -> Value {
    value.get(key).cloned().unwrap_or(default)
}

/// The list found under `key`, coerced with [`as_list`]; empty when missing.
pub(crate) fn list_at<'a>(value: &'a Value, key: &str) -> Vec<&'a Value> {
    value.get(key).map(as_list).unwrap_or_default()
}

/// Walks a dotted path (`ensembl.gene`) through nested objects.
pub(crate) fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Whether `sources` (when given) admits `name`.
pub(crate) fn source_allowed(sources: Option<&[String]>, name: &str) -> bool {
    sources.is_none_or(|allowed| allowed.iter().any(|s| s == name))
}

/// Renders a scalar the way it appears inside a query string or text cell.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
