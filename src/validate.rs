//! Shared field validators used by message builders.

// self
use crate::{_prelude::*, error::FormatError};

/// Requires a non-empty string.
pub(crate) fn require_non_empty(value: impl Into<String>, field: &str) -> Result<String> {
	let value = value.into();

	if value.is_empty() {
		return Err(Error::invalid_argument(format!("{field} cannot be empty")));
	}

	Ok(value)
}

/// Accepts an absent value, or a present non-empty one.
pub(crate) fn optional_non_empty(value: Option<&str>, field: &str) -> Result<Option<String>> {
	value.map(|value| require_non_empty(value, field)).transpose()
}

/// Parses an absolute URI; a string without a scheme is rejected as such.
pub(crate) fn parse_uri(raw: &str) -> Result<Url, FormatError> {
	Url::parse(raw).map_err(|source| match source {
		url::ParseError::RelativeUrlWithoutBase =>
			FormatError::MissingScheme { uri: raw.to_owned() },
		source => FormatError::InvalidUri { uri: raw.to_owned(), source },
	})
}

/// Parses an optional absolute URI.
pub(crate) fn parse_optional_uri(raw: Option<&str>) -> Result<Option<Url>, FormatError> {
	raw.map(parse_uri).transpose()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn uris_without_scheme_are_rejected() {
		assert!(matches!(parse_uri("/callback"), Err(FormatError::MissingScheme { .. })));
		assert!(matches!(
			parse_uri("app.example/callback"),
			Err(FormatError::MissingScheme { .. })
		));
		assert!(parse_uri("https://app.example/callback").is_ok());
		assert!(parse_uri("com.example.app:/oauth2redirect").is_ok());
		assert!(matches!(parse_uri("https://exa mple.com"), Err(FormatError::InvalidUri { .. })));
	}

	#[test]
	fn empty_strings_are_rejected() {
		assert!(require_non_empty("", "clientId").is_err());
		assert_eq!(optional_non_empty(None, "token").expect("Absent is valid."), None);
		assert!(optional_non_empty(Some(""), "token").is_err());
	}
}
