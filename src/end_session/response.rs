//! End-session response parsed from the post-logout redirect.

// self
use crate::{
	_prelude::*,
	carrier::DataCarrier,
	end_session::EndSessionRequest,
	json::{self, JsonObject},
	validate,
};

/// Carrier extra holding a serialized [`EndSessionResponse`].
pub const END_SESSION_RESPONSE_EXTRA: &str = "oauth2_messages.end_session_response";

const PARAM_STATE: &str = "state";

const KEY_REQUEST: &str = "request";
const KEY_STATE: &str = "state";

/// Returns true when `carrier` holds a serialized end-session response.
pub fn contains_end_session_response(carrier: &DataCarrier) -> bool {
	carrier.has_extra(END_SESSION_RESPONSE_EXTRA)
}

/// Response to an [`EndSessionRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndSessionResponse {
	request: EndSessionRequest,
	state: Option<String>,
}
impl EndSessionResponse {
	/// Returns a builder bound to the originating request.
	pub fn builder(request: EndSessionRequest) -> EndSessionResponseBuilder {
		EndSessionResponseBuilder::new(request)
	}

	/// Parses the post-logout redirect URI for `request`.
	pub fn from_uri(request: EndSessionRequest, uri: &Url) -> Result<Self> {
		Ok(Self::builder(request).redirect_uri(uri)?.build())
	}

	/// Originating request.
	pub fn request(&self) -> &EndSessionRequest {
		&self.request
	}

	/// Returned `state`.
	pub fn state(&self) -> Option<&str> {
		self.state.as_deref()
	}

	/// Serializes the response, embedding the full originating request.
	pub fn json_serialize(&self) -> JsonObject {
		let mut json = JsonObject::new();

		json::put(&mut json, KEY_REQUEST, self.request.json_serialize());
		json::put_if_some(&mut json, KEY_STATE, self.state.as_deref());

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
		if json.get(KEY_REQUEST).is_none_or(Value::is_null) {
			return Err(Error::invalid_argument(
				"end session request not provided and not found in JSON",
			));
		}

		let request = EndSessionRequest::json_deserialize(json::get_object(json, KEY_REQUEST)?)?;

		Self::json_deserialize_with_request(json, request)
	}

	/// String form of [`json_deserialize`](Self::json_deserialize).
	pub fn json_deserialize_str(json: &str) -> Result<Self> {
		Self::json_deserialize(&json::parse_object(json)?)
	}

	/// Reads a response and associates it with `request`, ignoring any embedded request.
	pub fn json_deserialize_with_request(
		json: &JsonObject,
		request: EndSessionRequest,
	) -> Result<Self> {
		let state = json::get_string_if_defined(json, KEY_STATE)?;

		Ok(Self::builder(request).state(state.as_deref())?.build())
	}

	/// Wraps the serialized response into a [`DataCarrier`].
	pub fn to_carrier(&self) -> DataCarrier {
		let mut carrier = DataCarrier::new();

		carrier.put_extra(END_SESSION_RESPONSE_EXTRA, self.json_serialize_string());

		carrier
	}

	/// Extracts a response previously stored with [`to_carrier`](Self::to_carrier).
	pub fn from_carrier(carrier: &DataCarrier) -> Result<Self> {
		let raw = carrier.extra(END_SESSION_RESPONSE_EXTRA).ok_or_else(|| {
			Error::invalid_argument("carrier does not contain an end session response")
		})?;

		Self::json_deserialize_str(raw)
	}
}

/// Builder for [`EndSessionResponse`] values.
#[derive(Clone, Debug)]
pub struct EndSessionResponseBuilder {
	request: EndSessionRequest,
	state: Option<String>,
}
impl EndSessionResponseBuilder {
	/// Creates an empty builder for a response to `request`.
	pub fn new(request: EndSessionRequest) -> Self {
		Self { request, state: None }
	}

	/// Reads `state` from the redirect URI query; other parameters are ignored.
	pub fn redirect_uri(self, uri: &Url) -> Result<Self> {
		let state = uri.query_pairs().find(|(key, _)| key == PARAM_STATE).map(|(_, value)| value);

		self.state(state.as_deref())
	}

	/// Sets or clears `state`.
	pub fn state(mut self, state: Option<&str>) -> Result<Self> {
		self.state = validate::optional_non_empty(state, PARAM_STATE)?;

		Ok(self)
	}

	/// Produces the immutable response.
	pub fn build(self) -> EndSessionResponse {
		EndSessionResponse { request: self.request, state: self.state }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{config::ServiceConfiguration, error::ErrorKind};

	fn request() -> EndSessionRequest {
		let configuration = ServiceConfiguration::new(
			Url::parse("https://idp.example/authorize").expect("Authorization URL should parse."),
			Url::parse("https://idp.example/token").expect("Token URL should parse."),
		);

		EndSessionRequest::builder(configuration, "https://app.example/out")
			.and_then(|b| b.state(Some("s-2")))
			.expect("Request fixture should be valid.")
			.build()
	}

	#[test]
	fn from_uri_reads_state() {
		let uri = Url::parse("https://app.example/out?state=s-2&ignored=1")
			.expect("Redirect URI should parse.");
		let response =
			EndSessionResponse::from_uri(request(), &uri).expect("Redirect should parse.");

		assert_eq!(response.state(), Some("s-2"));
	}

	#[test]
	fn json_and_carrier_round_trip() {
		let response = EndSessionResponse::builder(request())
			.state(Some("s-2"))
			.expect("State should be accepted.")
			.build();

		assert_eq!(
			EndSessionResponse::json_deserialize_str(&response.json_serialize_string())
				.expect("Serialized response should deserialize."),
			response
		);

		let carrier = response.to_carrier();

		assert!(contains_end_session_response(&carrier));
		assert_eq!(
			EndSessionResponse::from_carrier(&carrier).expect("Carrier should hold a response."),
			response
		);
	}

	#[test]
	fn missing_request_is_invalid_argument() {
		let err = EndSessionResponse::json_deserialize_str(r#"{"state":"s-2"}"#)
			.expect_err("Embedded request is required.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}
}
