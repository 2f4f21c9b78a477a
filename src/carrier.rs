//! String-keyed extras bag used to hand responses back to the host application.

// self
use crate::_prelude::*;

/// Opaque bag of string extras, the shape a platform intent or deep-link payload takes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataCarrier {
	extras: BTreeMap<String, String>,
}
impl DataCarrier {
	/// Creates an empty carrier.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value` under `key`, replacing any earlier value.
	pub fn put_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.extras.insert(key.into(), value.into());
	}

	/// Returns the extra stored under `key`.
	pub fn extra(&self, key: &str) -> Option<&str> {
		self.extras.get(key).map(String::as_str)
	}

	/// Whether an extra is stored under `key`.
	pub fn has_extra(&self, key: &str) -> bool {
		self.extras.contains_key(key)
	}

	/// Iterates over every stored extra in key order.
	pub fn extras(&self) -> impl Iterator<Item = (&str, &str)> {
		self.extras.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}
