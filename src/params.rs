//! Additional (non-standard) protocol parameters and their reserved-key validation.

// std
use std::slice::Iter;
// self
use crate::{_prelude::*, json::JsonObject};

/// Ordered string map of extra protocol parameters.
///
/// Keys are unique and keep the position of their first insertion; a repeated key
/// replaces the earlier value in place. Once attached to a built message the map is
/// never mutated.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AdditionalParameters(Vec<(String, String)>);
impl AdditionalParameters {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Returns true if `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.iter().any(|(k, _)| k == key)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no entries are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	fn insert(&mut self, key: String, value: String) {
		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some(slot) => slot.1 = value,
			None => self.0.push((key, value)),
		}
	}
}
impl<K, V> FromIterator<(K, V)> for AdditionalParameters
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Self::new();

		for (key, value) in iter {
			params.insert(key.into(), value.into());
		}

		params
	}
}
impl<'a> IntoIterator for &'a AdditionalParameters {
	type IntoIter = Iter<'a, (String, String)>;
	type Item = &'a (String, String);

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
impl Debug for AdditionalParameters {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_map().entries(self.iter()).finish()
	}
}

/// Validates caller-supplied parameters against the reserved names of a message type.
///
/// Fails with [`Error::ReservedParameter`] on the first reserved key; otherwise returns an
/// owned copy of the input.
pub fn check_additional_params<I, K, V>(
	params: I,
	reserved: &[&str],
) -> Result<AdditionalParameters>
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: Into<String>,
{
	let params = params.into_iter().collect::<AdditionalParameters>();

	if let Some((key, _)) = params.iter().find(|(key, _)| reserved.contains(key)) {
		return Err(Error::ReservedParameter { key: key.to_string() });
	}

	Ok(params)
}

/// Collects every non-reserved sibling field of a response body.
///
/// String values are taken verbatim; other JSON values use their serialized text.
pub fn extract_additional_params(json: &JsonObject, reserved: &[&str]) -> AdditionalParameters {
	json.iter()
		.filter(|(key, _)| !reserved.contains(&key.as_str()))
		.map(|(key, value)| {
			let text = match value {
				Value::String(s) => s.clone(),
				other => other.to_string(),
			};

			(key.clone(), text)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const RESERVED: &[&str] = &["client_id", "redirect_uri", "token"];

	#[test]
	fn reserved_keys_are_rejected() {
		let err = check_additional_params([("audience", "api"), ("token", "x")], RESERVED)
			.expect_err("Reserved keys must be rejected.");

		assert!(matches!(err, Error::ReservedParameter { ref key } if key == "token"));
	}

	#[test]
	fn non_overlapping_maps_are_copied_in_order() {
		let params =
			check_additional_params([("b", "2"), ("a", "1")], RESERVED).expect("Params are valid.");

		assert_eq!(params.iter().collect::<Vec<_>>(), vec![("b", "2"), ("a", "1")]);
		assert!(
			check_additional_params(Vec::<(String, String)>::new(), RESERVED)
				.expect("Empty input is valid.")
				.is_empty()
		);
	}

	#[test]
	fn duplicate_keys_keep_first_position() {
		let params: AdditionalParameters =
			[("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();

		assert_eq!(params.len(), 2);
		assert_eq!(params.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
	}

	#[test]
	fn extraction_skips_reserved_and_stringifies() {
		let json = serde_json::json!({ "token": "t", "note": "hi", "count": 3, "ok": true });
		let Value::Object(object) = json else { unreachable!() };
		let params = extract_additional_params(&object, &["token"]);

		assert!(!params.contains_key("token"));
		assert_eq!(params.get("note"), Some("hi"));
		assert_eq!(params.get("count"), Some("3"));
		assert_eq!(params.get("ok"), Some("true"));
	}
}
