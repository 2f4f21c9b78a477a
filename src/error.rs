//! Crate-level error types shared by builders, JSON codecs, and the dispatcher.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// JSON document is missing a required key or carries a value of the wrong shape.
	#[error(transparent)]
	MalformedJson(#[from] JsonError),
	/// A semantically constrained string failed its format rule.
	#[error(transparent)]
	Format(#[from] FormatError),

	/// Required value is absent or empty, or no message variant matched the input.
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Human-readable reason string.
		reason: String,
	},
	/// Caller-supplied additional parameter collides with a protocol parameter.
	#[error("Parameter `{key}` is directly supported and cannot be used as an additional parameter.")]
	ReservedParameter {
		/// The offending parameter name.
		key: String,
	},
	/// Authorization server redirected back with an OAuth error.
	#[error("Authorization server returned an OAuth error: {error}.")]
	Authorization {
		/// OAuth `error` code.
		error: String,
		/// Optional `error_description`.
		description: Option<String>,
		/// Optional `error_uri`.
		uri: Option<String>,
	},
}
impl Error {
	/// Builds an [`Error::InvalidArgument`] from any displayable reason.
	pub fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	/// Collapses the error onto its coarse category.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::MalformedJson(_) => ErrorKind::MalformedJson,
			Error::Format(_) => ErrorKind::Format,
			Error::InvalidArgument { .. } | Error::ReservedParameter { .. } =>
				ErrorKind::InvalidArgument,
			Error::Authorization { .. } => ErrorKind::Provider,
		}
	}
}

/// Coarse error categories used by hosts deciding whether to restart a flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Required value missing/empty, reserved key reused, or no variant matched.
	InvalidArgument,
	/// Syntactically valid JSON with a missing key or a wrongly typed value.
	MalformedJson,
	/// PKCE verifier or URI failed its format rule.
	Format,
	/// The authorization server reported an error on the redirect.
	Provider,
}

/// Failures raised while reading persisted or transmitted JSON.
#[derive(Debug, ThisError)]
pub enum JsonError {
	/// Input is not valid JSON.
	#[error("Input is not valid JSON.")]
	Syntax(#[from] serde_json::Error),
	/// Top-level JSON value is not an object.
	#[error("JSON value must be an object.")]
	NotAnObject,
	/// Required key is absent.
	#[error("JSON object is missing the `{key}` key.")]
	MissingKey {
		/// Missing key.
		key: String,
	},
	/// Key is present but holds a value of the wrong type.
	#[error("JSON key `{key}` must hold a {expected}.")]
	WrongType {
		/// Offending key.
		key: String,
		/// Expected JSON shape.
		expected: &'static str,
	},
	/// Key holds a string that is not an absolute URL.
	#[error("JSON key `{key}` does not hold a valid URL.")]
	InvalidUrl {
		/// Offending key.
		key: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Key holds a number that is not a representable instant.
	#[error("JSON key `{key}` does not hold a valid timestamp.")]
	InvalidTimestamp {
		/// Offending key.
		key: String,
	},
	/// Nested service configuration could not be decoded.
	#[error("Service configuration is malformed.")]
	Configuration(#[source] serde_path_to_error::Error<serde_json::Error>),
}
impl JsonError {
	pub(crate) fn missing(key: &str) -> Self {
		Self::MissingKey { key: key.to_owned() }
	}

	pub(crate) fn wrong_type(key: &str, expected: &'static str) -> Self {
		Self::WrongType { key: key.to_owned(), expected }
	}
}

/// Format-rule violations for PKCE verifiers and URIs.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum FormatError {
	/// Code verifier length falls outside the RFC 7636 bounds.
	#[error("Code verifier length {len} is outside {min}..={max}.")]
	CodeVerifierLength {
		/// Observed length.
		len: usize,
		/// Minimum permitted length.
		min: usize,
		/// Maximum permitted length.
		max: usize,
	},
	/// Code verifier contains characters outside the unreserved set.
	#[error("Code verifier contains characters outside [A-Za-z0-9-._~].")]
	CodeVerifierCharset,
	/// URI has no scheme component.
	#[error("URI `{uri}` must have a scheme.")]
	MissingScheme {
		/// Offending URI string.
		uri: String,
	},
	/// URI cannot be parsed.
	#[error("URI `{uri}` is invalid.")]
	InvalidUri {
		/// Offending URI string.
		uri: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn kinds_collapse_variants() {
		assert_eq!(Error::invalid_argument("x").kind(), ErrorKind::InvalidArgument);
		assert_eq!(
			Error::ReservedParameter { key: "token".into() }.kind(),
			ErrorKind::InvalidArgument
		);
		assert_eq!(Error::from(JsonError::missing("clientId")).kind(), ErrorKind::MalformedJson);
		assert_eq!(Error::from(FormatError::CodeVerifierCharset).kind(), ErrorKind::Format);
	}

	#[test]
	fn messages_name_the_offending_key() {
		let err = Error::from(JsonError::wrong_type("token", "string"));

		assert_eq!(err.to_string(), "JSON key `token` must hold a string.");
	}
}
