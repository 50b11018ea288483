use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, LcaError};

fn serde_error(code: &str, err: impl ToString) -> LcaError {
    LcaError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Canonical JSON bytes of a result, report or table set; object keys sorted at every depth.
///
/// These bytes feed every input, result and table hash.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, LcaError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json_write", err))?;
    Ok(bytes)
}

/// Pretty canonical JSON for per-scenario files and CLI output.
pub fn to_canonical_json_pretty<T: Serialize>(value: &T) -> Result<String, LcaError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    serde_json::to_string_pretty(&canonicalize(value))
        .map_err(|err| serde_error("json_write", err))
}

/// Parses a JSON scenario document.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, LcaError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Renders a scenario, plan or table set as YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, LcaError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Parses a YAML scenario, plan or table file.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, LcaError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}
