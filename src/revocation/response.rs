//! RFC 7009 token revocation response.

// self
use crate::{
	_prelude::*,
	json::{self, JsonObject},
	obs::{self, MessageKind},
	params::{self, AdditionalParameters},
	revocation::TokenRevocationRequest,
};

const KEY_REQUEST: &str = "request";
const KEY_TOKEN: &str = "token";
const KEY_ADDITIONAL_PARAMETERS: &str = "additionalParameters";

const BUILT_IN_PARAMS: &[&str] = &[KEY_TOKEN];

/// Response to a [`TokenRevocationRequest`].
///
/// RFC 7009 defines no success body, so any field the server returns (other than `token`) is
/// kept as an additional parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRevocationResponse {
	request: TokenRevocationRequest,
	additional_parameters: AdditionalParameters,
}
impl TokenRevocationResponse {
	/// Returns a builder bound to the originating request.
	pub fn builder(request: TokenRevocationRequest) -> TokenRevocationResponseBuilder {
		TokenRevocationResponseBuilder::new(request)
	}

	/// Originating request.
	pub fn request(&self) -> &TokenRevocationRequest {
		&self.request
	}

	/// Additional response parameters.
	pub fn additional_parameters(&self) -> &AdditionalParameters {
		&self.additional_parameters
	}

	/// Serializes the response, embedding the full originating request.
	pub fn json_serialize(&self) -> JsonObject {
		let mut json = JsonObject::new();

		json::put(&mut json, KEY_REQUEST, self.request.json_serialize());
		json::put(
			&mut json,
			KEY_ADDITIONAL_PARAMETERS,
			json::map_to_json_object(&self.additional_parameters),
		);

		json
	}

	/// String form of [`json_serialize`](Self::json_serialize).
	pub fn json_serialize_string(&self) -> String {
		Value::Object(self.json_serialize()).to_string()
	}

	/// Reads a response whose originating request is embedded under `request`.
	///
	/// Fails with [`Error::InvalidArgument`] when the request is not embedded.
	pub fn json_deserialize(json: &JsonObject) -> Result<Self> {
		obs::observe(MessageKind::Revocation, "revocation_response.json_deserialize", || {
			if json.get(KEY_REQUEST).is_none_or(Value::is_null) {
				return Err(Error::invalid_argument(
					"token revocation request not provided and not found in JSON",
				));
			}

			let request =
				TokenRevocationRequest::json_deserialize(json::get_object(json, KEY_REQUEST)?)?;

			Self::read_with_request(json, request)
		})
	}

	/// String form of [`json_deserialize`](Self::json_deserialize); an empty string is rejected.
	pub fn json_deserialize_str(json: &str) -> Result<Self> {
		if json.is_empty() {
			return Err(Error::invalid_argument("json string cannot be empty"));
		}

		Self::json_deserialize(&json::parse_object(json)?)
	}

	/// Reads a response and associates it with `request`, ignoring any embedded request.
	pub fn json_deserialize_with_request(
		json: &JsonObject,
		request: TokenRevocationRequest,
	) -> Result<Self> {
		obs::observe(MessageKind::Revocation, "revocation_response.json_deserialize", || {
			Self::read_with_request(json, request)
		})
	}

	fn read_with_request(json: &JsonObject, request: TokenRevocationRequest) -> Result<Self> {
		let additional = json::get_string_map(json, KEY_ADDITIONAL_PARAMETERS)?;

		Ok(Self::builder(request).additional_parameters(additional.iter())?.build())
	}
}

/// Builder for [`TokenRevocationResponse`] values.
#[derive(Clone, Debug)]
pub struct TokenRevocationResponseBuilder {
	request: TokenRevocationRequest,
	additional_parameters: AdditionalParameters,
}
impl TokenRevocationResponseBuilder {
	/// Creates a builder for a response to `request`.
	pub fn new(request: TokenRevocationRequest) -> Self {
		Self { request, additional_parameters: AdditionalParameters::new() }
	}

	/// Replaces the originating request.
	pub fn request(mut self, request: TokenRevocationRequest) -> Self {
		self.request = request;

		self
	}

	/// Captures every non-reserved field of a revocation endpoint body.
	pub fn response_json(mut self, json: &JsonObject) -> Self {
		self.additional_parameters = params::extract_additional_params(json, BUILT_IN_PARAMS);

		self
	}

	/// Parses a revocation endpoint body; an empty body is rejected.
	pub fn response_json_str(self, json: &str) -> Result<Self> {
		if json.is_empty() {
			return Err(Error::invalid_argument("json cannot be empty"));
		}

		Ok(self.response_json(&json::parse_object(json)?))
	}

	/// Replaces the additional parameters; `token` is rejected.
	pub fn additional_parameters<I, K, V>(mut self, params: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.additional_parameters = params::check_additional_params(params, BUILT_IN_PARAMS)?;

		Ok(self)
	}

	/// Produces the immutable response.
	pub fn build(self) -> TokenRevocationResponse {
		TokenRevocationResponse {
			request: self.request,
			additional_parameters: self.additional_parameters,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{config::ServiceConfiguration, error::ErrorKind};

	fn request() -> TokenRevocationRequest {
		let configuration = ServiceConfiguration::new(
			Url::parse("https://idp.example/authorize").expect("Authorization URL should parse."),
			Url::parse("https://idp.example/token").expect("Token URL should parse."),
		);

		TokenRevocationRequest::builder(configuration, "client1")
			.and_then(|b| b.token(Some("tok-xyz")))
			.expect("Request fixture should be valid.")
			.build()
	}

	#[test]
	fn response_json_captures_non_reserved_fields() {
		let response = TokenRevocationResponse::builder(request())
			.response_json_str(r#"{"token":"echo","revoked_at":1700000000,"note":"ok"}"#)
			.expect("Response body should parse.")
			.build();

		assert!(!response.additional_parameters().contains_key("token"));
		assert_eq!(response.additional_parameters().get("revoked_at"), Some("1700000000"));
		assert_eq!(response.additional_parameters().get("note"), Some("ok"));
	}

	#[test]
	fn empty_body_is_rejected() {
		let err = TokenRevocationResponse::builder(request())
			.response_json_str("")
			.expect_err("Empty body must be rejected.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[test]
	fn token_is_reserved() {
		assert!(
			TokenRevocationResponse::builder(request())
				.additional_parameters([("token", "x")])
				.is_err()
		);
	}

	#[test]
	fn json_round_trip_embeds_request() {
		let response = TokenRevocationResponse::builder(request())
			.additional_parameters([("note", "ok")])
			.expect("Additional parameters should be accepted.")
			.build();
		let restored =
			TokenRevocationResponse::json_deserialize_str(&response.json_serialize_string())
				.expect("Serialized response should deserialize.");

		assert_eq!(restored, response);
	}

	#[test]
	fn missing_request_is_invalid_argument() {
		let err = TokenRevocationResponse::json_deserialize_str(r#"{"additionalParameters":{}}"#)
			.expect_err("Embedded request is required.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[test]
	fn empty_json_string_is_invalid_argument() {
		let err = TokenRevocationResponse::json_deserialize_str("")
			.expect_err("Empty JSON string must be rejected.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
		assert_eq!(
			TokenRevocationResponse::json_deserialize_str("{")
				.expect_err("Broken JSON must be rejected.")
				.kind(),
			ErrorKind::MalformedJson
		);
	}

	#[test]
	fn supplied_request_wins() {
		let json = json::parse_object(r#"{"additionalParameters":{"note":"ok"}}"#)
			.expect("Fixture JSON should parse.");
		let response = TokenRevocationResponse::json_deserialize_with_request(&json, request())
			.expect("Supplied request should satisfy deserialization.");

		assert_eq!(response.request().token(), Some("tok-xyz"));
		assert_eq!(response.additional_parameters().get("note"), Some("ok"));
	}
}
