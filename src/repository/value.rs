//! JSON <-> Firestore typed value codec and update-mask field paths

use serde_json::{json, Map, Number, Value};

use super::{StoreError, StoreResult};
use crate::models::Fields;

/// Encode a JSON value as a Firestore `Value`
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode a field bag as the `fields` member of a Firestore document
pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

/// Decode a Firestore `Value` into plain JSON
pub fn decode_value(value: &Value) -> StoreResult<Value> {
    let typed = value
        .as_object()
        .and_then(|o| o.iter().next())
        .map(|(kind, inner)| (kind.as_str(), inner))
        .ok_or_else(|| StoreError::Decode(format!("not a typed value: {}", value)))?;

    match typed {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| StoreError::Decode(format!("bad integerValue {:?}: {}", s, e))),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        // NaN and the infinities are spelled out as strings and have no JSON form
        ("doubleValue", Value::String(_)) => Ok(Value::Null),
        ("stringValue", Value::String(s))
        | ("timestampValue", Value::String(s))
        | ("referenceValue", Value::String(s))
        | ("bytesValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("geoPointValue", Value::Object(point)) => {
            let coordinate = |name: &str| {
                point
                    .get(name)
                    .and_then(Value::as_f64)
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::from(0))
            };
            Ok(json!({ "latitude": coordinate("latitude"), "longitude": coordinate("longitude") }))
        }
        ("arrayValue", Value::Object(array)) => match array.get("values") {
            Some(Value::Array(values)) => values
                .iter()
                .map(decode_value)
                .collect::<StoreResult<Vec<_>>>()
                .map(Value::Array),
            _ => Ok(Value::Array(Vec::new())),
        },
        ("mapValue", Value::Object(map)) => match map.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            _ => Ok(Value::Object(Map::new())),
        },
        (kind, _) => Err(StoreError::Decode(format!("unsupported value {}", kind))),
    }
}

/// Decode the `fields` member of a Firestore document
pub fn decode_fields(fields: &Map<String, Value>) -> StoreResult<Fields> {
    fields
        .iter()
        .map(|(name, value)| decode_value(value).map(|v| (name.clone(), v)))
        .collect()
}

/// Leaf field paths touched by a merge of `fields`.
///
/// Non-empty maps are descended into so that sibling keys already stored
/// under the same map survive; every other value replaces its path whole.
pub fn field_paths(fields: &Fields) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(fields, None, &mut paths);
    paths
}

fn collect_paths(fields: &Fields, prefix: Option<&str>, paths: &mut Vec<String>) {
    for (name, value) in fields {
        let segment = quote_segment(name);
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, segment),
            None => segment,
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => collect_paths(inner, Some(&path), paths),
            _ => paths.push(path),
        }
    }
}

/// Back-quote a path segment unless it is a simple identifier
fn quote_segment(name: &str) -> String {
    let mut chars = name.chars();
    let simple = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}
