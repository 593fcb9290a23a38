//! Free-form mesh metadata exported as glTF `extras`

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::error::MetadataError;

/// Mesh metadata, keyed by name
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Units that need no annotation (glTF is implicitly in meters)
const IMPLICIT_UNITS: [&str; 3] = ["m", "meter", "meters"];

/// Build the `extras` object for a mesh
///
/// Top-level keys starting with `_` are internal and skipped. Units other
/// than meters are recorded under `units`.
pub fn mesh_extras(
    metadata: &Metadata,
    units: Option<&str>,
) -> Result<Map<String, Value>, MetadataError> {
    let mut extras = Map::new();
    for (key, value) in metadata {
        if key.starts_with('_') {
            continue;
        }
        extras.insert(key.clone(), jsonify(key, value)?);
    }

    if let Some(units) = units {
        if !IMPLICIT_UNITS.contains(&units) {
            extras.insert("units".to_string(), Value::String(units.to_string()));
        }
    }

    Ok(extras)
}

fn jsonify(key: &str, value: &MetadataValue) -> Result<Value, MetadataError> {
    Ok(match value {
        MetadataValue::Bool(b) => Value::Bool(*b),
        MetadataValue::Int(i) => Value::Number((*i).into()),
        MetadataValue::Float(f) => match Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            None => {
                return Err(MetadataError::NonFiniteFloat {
                    key: key.to_string(),
                    value: *f,
                });
            }
        },
        MetadataValue::Text(s) => Value::String(s.clone()),
        MetadataValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| jsonify(key, item))
                .collect::<Result<_, _>>()?,
        ),
        MetadataValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), jsonify(k, v)?)))
                .collect::<Result<_, MetadataError>>()?,
        ),
    })
}
