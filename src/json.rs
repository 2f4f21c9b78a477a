//! Field accessors for the JSON persistence format.
//!
//! Readers are tolerant of absent optional keys (and explicit `null`) but reject present
//! values of the wrong shape. Writers skip absent values so persisted documents stay minimal.

// self
use crate::{_prelude::*, error::JsonError, params::AdditionalParameters};

/// JSON object type used throughout the persistence format.
pub type JsonObject = Map<String, Value>;

/// Parses a JSON string that must hold an object.
pub fn parse_object(json: &str) -> Result<JsonObject, JsonError> {
	match serde_json::from_str::<Value>(json)? {
		Value::Object(object) => Ok(object),
		_ => Err(JsonError::NotAnObject),
	}
}

/// Reads a required string field.
pub fn get_string(json: &JsonObject, key: &str) -> Result<String, JsonError> {
	get_string_if_defined(json, key)?.ok_or_else(|| JsonError::missing(key))
}

/// Reads an optional string field.
pub fn get_string_if_defined(json: &JsonObject, key: &str) -> Result<Option<String>, JsonError> {
	match json.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(value)) => Ok(Some(value.clone())),
		Some(_) => Err(JsonError::wrong_type(key, "string")),
	}
}

/// Reads an optional absolute URL field.
pub fn get_url_if_defined(json: &JsonObject, key: &str) -> Result<Option<Url>, JsonError> {
	get_string_if_defined(json, key)?
		.map(|raw| {
			Url::parse(&raw).map_err(|source| JsonError::InvalidUrl { key: key.to_owned(), source })
		})
		.transpose()
}

/// Reads an optional integer field.
pub fn get_i64_if_defined(json: &JsonObject, key: &str) -> Result<Option<i64>, JsonError> {
	match json.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(value) =>
			value.as_i64().map(Some).ok_or_else(|| JsonError::wrong_type(key, "integer")),
	}
}

/// Reads a required nested object field.
pub fn get_object<'a>(json: &'a JsonObject, key: &str) -> Result<&'a JsonObject, JsonError> {
	match json.get(key) {
		None | Some(Value::Null) => Err(JsonError::missing(key)),
		Some(Value::Object(object)) => Ok(object),
		Some(_) => Err(JsonError::wrong_type(key, "object")),
	}
}

/// Reads a nested string map; an absent key yields an empty map.
///
/// Numbers and booleans are accepted through their textual form; arrays, objects, and
/// `null` entries are rejected.
pub fn get_string_map(json: &JsonObject, key: &str) -> Result<AdditionalParameters, JsonError> {
	let object = match json.get(key) {
		None | Some(Value::Null) => return Ok(AdditionalParameters::new()),
		Some(Value::Object(object)) => object,
		Some(_) => return Err(JsonError::wrong_type(key, "object")),
	};

	object
		.iter()
		.map(|(entry, value)| {
			let text = match value {
				Value::String(s) => s.clone(),
				Value::Number(n) => n.to_string(),
				Value::Bool(b) => b.to_string(),
				_ => return Err(JsonError::wrong_type(&format!("{key}.{entry}"), "scalar")),
			};

			Ok((entry.clone(), text))
		})
		.collect()
}

/// Writes a field unconditionally.
pub fn put(json: &mut JsonObject, key: &str, value: impl Into<Value>) {
	json.insert(key.to_owned(), value.into());
}

/// Writes a field only when a value is present.
pub fn put_if_some<V>(json: &mut JsonObject, key: &str, value: Option<V>)
where
	V: Into<Value>,
{
	if let Some(value) = value {
		put(json, key, value);
	}
}

/// Serializes a string map as a nested JSON object in insertion order.
pub fn map_to_json_object(params: &AdditionalParameters) -> JsonObject {
	params.iter().map(|(key, value)| (key.to_owned(), Value::from(value))).collect()
}
