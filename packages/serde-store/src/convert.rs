//! Conversions between Value and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use dotconf_core::{Error, Format, Mapping, Value};

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    // Convert Value to serde_json::Value first, then deserialize
    let json = value_to_json(value);
    serde_json::from_value(json).map_err(|e| Error::Other {
        message: format!("cannot deserialize value: {}", e),
    })
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    // Serialize to serde_json::Value first, then convert to Value
    let json = serde_json::to_value(data).map_err(|e| Error::encode(&Format::JSON, e.to_string()))?;
    Ok(json_to_value(json))
}

/// Convert our Value to serde_json::Value.
///
/// JSON has no NaN or infinities, so non-finite floats become `null`. Use
/// [`first_non_finite`] to catch them before encoding a document.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Sequence(seq) => {
            serde_json::Value::Array(seq.into_iter().map(value_to_json).collect())
        }
        Value::Mapping(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Dotted path of the first NaN or infinite float in `value`, if any.
///
/// Sequence elements are addressed by index.
pub fn first_non_finite(value: &Value) -> Option<String> {
    match value {
        Value::Float(f) if !f.is_finite() => Some(String::new()),
        Value::Sequence(seq) => seq.iter().enumerate().find_map(|(i, v)| {
            first_non_finite(v).map(|rest| join_key(&i.to_string(), &rest))
        }),
        Value::Mapping(map) => map
            .iter()
            .find_map(|(k, v)| first_non_finite(v).map(|rest| join_key(k, &rest))),
        _ => None,
    }
}

fn join_key(key: &str, rest: &str) -> String {
    if rest.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", key, rest)
    }
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for very large numbers
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::Sequence(arr.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

/// Convert our Value to serde_yaml::Value.
pub fn value_to_yaml(value: Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(b),
        Value::Integer(i) => serde_yaml::Value::Number(i.into()),
        Value::Float(f) => serde_yaml::Value::Number(f.into()),
        Value::String(s) => serde_yaml::Value::String(s),
        Value::Sequence(seq) => {
            serde_yaml::Value::Sequence(seq.into_iter().map(value_to_yaml).collect())
        }
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::with_capacity(map.len());
            for (k, v) in map {
                out.insert(serde_yaml::Value::String(k), value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(out)
        }
    }
}

/// Convert serde_yaml::Value to our Value.
///
/// Scalar mapping keys are stringified (`1: x` becomes key `"1"`). Tags are
/// dropped. Fails on keys that are sequences or mappings, and on two keys
/// that stringify to the same text.
pub fn yaml_to_value(yaml: serde_yaml::Value) -> Result<Value, String> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(yaml_to_value)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (k, v) in map {
                let key = yaml_key(k)?;
                if out.contains_key(&key) {
                    return Err(format!("duplicate key {:?}", key));
                }
                out.insert(key, yaml_to_value(v)?);
            }
            Value::Mapping(out)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(format!("unsupported mapping key: {:?}", other)),
    }
}
