//! Value maps.
//!
//! Latches are rendered from maps of key to string. The typed [`Values`]
//! map cannot hold anything else, so shape checking only happens where
//! values arrive as JSON.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{LatchError, Result};

/// Key to string map rendered into a latch. Iteration follows insertion order.
pub type Values = IndexMap<String, String>;

/// Build a [`Values`] map from string pairs.
pub fn values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Values {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Convert a JSON object of strings into [`Values`].
pub fn values_from_json(json: &Value) -> Result<Values> {
    object_of_strings("values", json)
}

/// Convert a JSON array of objects of strings into a list of [`Values`].
pub fn list_from_json(json: &Value) -> Result<Vec<Values>> {
    let Value::Array(items) = json else {
        return Err(LatchError::argument(
            "list",
            format!("expected an array, got {}", describe(json)),
        ));
    };
    items
        .iter()
        .map(|item| object_of_strings("list", item))
        .collect()
}

fn object_of_strings(argument: &'static str, json: &Value) -> Result<Values> {
    let Value::Object(map) = json else {
        return Err(LatchError::argument(
            argument,
            format!("expected an object, got {}", describe(json)),
        ));
    };

    map.iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key.clone(), text.clone())),
            other => Err(LatchError::argument(
                argument,
                format!("value for `{key}` must be a string, got {}", describe(other)),
            )),
        })
        .collect()
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn describe(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
