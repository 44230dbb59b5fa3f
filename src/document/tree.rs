use super::path::NodePath;
use crate::error::TransformError;
use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

pub fn as_object<'a>(value: &'a Value, path: &NodePath) -> Result<&'a Object, TransformError> {
    value.as_object().ok_or_else(|| TransformError::UnexpectedType {
        path: path.to_string(),
        expected: "object",
    })
}

pub fn as_object_mut<'a>(
    value: &'a mut Value,
    path: &NodePath,
) -> Result<&'a mut Object, TransformError> {
    value.as_object_mut().ok_or_else(|| TransformError::UnexpectedType {
        path: path.to_string(),
        expected: "object",
    })
}

/// Looks up a member that must exist.
pub fn child<'a>(
    object: &'a Object,
    key: &str,
    path: &NodePath,
) -> Result<&'a Value, TransformError> {
    object.get(key).ok_or_else(|| missing(path, key))
}

pub fn child_mut<'a>(
    object: &'a mut Object,
    key: &str,
    path: &NodePath,
) -> Result<&'a mut Value, TransformError> {
    object.get_mut(key).ok_or_else(|| missing(path, key))
}

/// Looks up a member that must exist and hold a string.
pub fn child_str<'a>(
    object: &'a Object,
    key: &str,
    path: &NodePath,
) -> Result<&'a str, TransformError> {
    child(object, key, path)?
        .as_str()
        .ok_or_else(|| TransformError::UnexpectedType {
            path: path.key(key).to_string(),
            expected: "string",
        })
}

/// Looks up an optional array member; a present member of another type is an error.
pub fn array_mut<'a>(
    object: &'a mut Object,
    key: &str,
    path: &NodePath,
) -> Result<Option<&'a mut Vec<Value>>, TransformError> {
    match object.get_mut(key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(TransformError::UnexpectedType {
            path: path.key(key).to_string(),
            expected: "array",
        }),
    }
}

/// Inserts `key` directly after `anchor`, or at the end if `anchor` is absent.
/// An existing `key` is overwritten where it stands.
pub fn insert_after(object: &mut Object, anchor: &str, key: &str, value: Value) {
    if let Some(slot) = object.get_mut(key) {
        *slot = value;
        return;
    }
    match object.keys().position(|k| k == anchor) {
        Some(index) => {
            object.shift_insert(index + 1, key.to_string(), value);
        }
        None => {
            object.insert(key.to_string(), value);
        }
    }
}

/// Returns the array under `key`, creating an empty one after `anchor` if it is missing.
pub fn array_or_insert_after<'a>(
    object: &'a mut Object,
    key: &str,
    anchor: &str,
    path: &NodePath,
) -> Result<&'a mut Vec<Value>, TransformError> {
    if !object.contains_key(key) {
        insert_after(object, anchor, key, Value::Array(Vec::new()));
    }
    array_mut(object, key, path)?.ok_or_else(|| missing(path, key))
}

pub fn missing(path: &NodePath, field: &str) -> TransformError {
    TransformError::MissingField {
        path: path.to_string(),
        field: field.to_string(),
    }
}
