//! Defensive access to untyped JSON payloads.
//!
//! Every projection in the crate goes through these helpers so the alerts and
//! forecast handlers apply the same rules: a missing or `null` optional field
//! takes its default, a present field of the wrong type is a parse failure.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::constants::UNKNOWN;
use crate::error::FetchError;

pub type JsonMap = serde_json::Map<String, Value>;

/// Reads `key` as `T`, or `default` when it is absent or `null`.
pub fn field_or<T: DeserializeOwned>(map: &JsonMap, key: &str, default: T) -> Result<T, FetchError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => T::deserialize(value)
            .map_err(|e| FetchError::parse(format!("field '{key}': {e}"))),
    }
}

/// String field defaulting to the [`UNKNOWN`] placeholder.
pub fn text_or_unknown(map: &JsonMap, key: &str) -> Result<String, FetchError> {
    field_or(map, key, UNKNOWN.to_string())
}

/// Object field defaulting to an empty object.
pub fn object_or_empty<'a>(map: &'a JsonMap, key: &str) -> Result<Cow<'a, JsonMap>, FetchError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Cow::Owned(JsonMap::new())),
        Some(value) => as_object(value, key).map(Cow::Borrowed),
    }
}

/// Array field defaulting to an empty slice.
pub fn array_or_empty<'a>(map: &'a JsonMap, key: &str) -> Result<&'a [Value], FetchError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(FetchError::parse(format!("field '{key}' is not an array"))),
    }
}

/// Object that must be present. `path` names it in the error.
pub fn required_object<'a>(map: &'a JsonMap, key: &str, path: &str) -> Result<&'a JsonMap, FetchError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(FetchError::missing_field(path)),
        Some(value) => as_object(value, path),
    }
}

/// Array that must be present.
pub fn required_array<'a>(map: &'a JsonMap, key: &str, path: &str) -> Result<&'a [Value], FetchError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(FetchError::missing_field(path)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(FetchError::parse(format!("field '{path}' is not an array"))),
    }
}

/// String that must be present.
pub fn required_str<'a>(map: &'a JsonMap, key: &str, path: &str) -> Result<&'a str, FetchError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(FetchError::missing_field(path)),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(FetchError::parse(format!("field '{path}' is not a string"))),
    }
}

pub fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a JsonMap, FetchError> {
    value
        .as_object()
        .ok_or_else(|| FetchError::parse(format!("'{what}' is not an object")))
}

/// Follows `path` through nested objects. Any missing or non-object level yields `None`.
pub fn lookup_str<'a>(map: &'a JsonMap, path: &[&str]) -> Option<&'a str> {
    let (last, parents) = path.split_last()?;
    let mut current = map;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)?.as_str()
}
