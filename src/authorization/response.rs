//! Authorization response parsed from the redirect URI.

// self
use crate::{
	_prelude::*,
	authorization::AuthorizationRequest,
	carrier::DataCarrier,
	error::JsonError,
	json::{self, JsonObject},
	params::{self, AdditionalParameters},
	validate,
};

/// Carrier extra holding a serialized [`AuthorizationResponse`].
pub const AUTHORIZATION_RESPONSE_EXTRA: &str = "oauth2_messages.authorization_response";

const PARAM_ACCESS_TOKEN: &str = "access_token";
const PARAM_CODE: &str = "code";
const PARAM_EXPIRES_IN: &str = "expires_in";
const PARAM_ID_TOKEN: &str = "id_token";
const PARAM_SCOPE: &str = "scope";
const PARAM_STATE: &str = "state";
const PARAM_TOKEN_TYPE: &str = "token_type";

const KEY_REQUEST: &str = "request";
const KEY_EXPIRES_AT: &str = "expires_at";
const KEY_ADDITIONAL_PARAMETERS: &str = "additional_parameters";

const BUILT_IN_PARAMS: &[&str] = &[
	PARAM_TOKEN_TYPE,
	PARAM_STATE,
	PARAM_CODE,
	PARAM_ACCESS_TOKEN,
	PARAM_EXPIRES_IN,
	PARAM_ID_TOKEN,
	PARAM_SCOPE,
];

/// Returns true when `carrier` holds a serialized authorization response.
pub fn contains_authorization_response(carrier: &DataCarrier) -> bool {
	carrier.has_extra(AUTHORIZATION_RESPONSE_EXTRA)
}

/// Successful authorization response bound to its originating request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
	request: AuthorizationRequest,
	state: Option<String>,
	token_type: Option<String>,
	authorization_code: Option<String>,
	access_token: Option<String>,
	access_token_expiration_time: Option<OffsetDateTime>,
	id_token: Option<String>,
	scope: Option<String>,
	additional_parameters: AdditionalParameters,
}
impl AuthorizationResponse {
	/// Returns a builder bound to the originating request.
	pub fn builder(request: AuthorizationRequest) -> AuthorizationResponseBuilder {
		AuthorizationResponseBuilder::new(request)
	}

	/// Parses the redirect URI the provider sent back for `request`.
	pub fn from_uri(request: AuthorizationRequest, uri: &Url, now: OffsetDateTime) -> Result<Self> {
		Ok(Self::builder(request).redirect_uri(uri, now)?.build())
	}

	/// Originating request.
	pub fn request(&self) -> &AuthorizationRequest {
		&self.request
	}

	/// Returned `state`.
	pub fn state(&self) -> Option<&str> {
		self.state.as_deref()
	}

	/// Token type of an implicitly issued access token.
	pub fn token_type(&self) -> Option<&str> {
		self.token_type.as_deref()
	}

	/// Authorization code to exchange at the token endpoint.
	pub fn authorization_code(&self) -> Option<&str> {
		self.authorization_code.as_deref()
	}

	/// Implicitly issued access token.
	pub fn access_token(&self) -> Option<&str> {
		self.access_token.as_deref()
	}

	/// Absolute expiry of [`access_token`](Self::access_token).
	pub fn access_token_expiration_time(&self) -> Option<OffsetDateTime> {
		self.access_token_expiration_time
	}

	/// Returned ID token.
	pub fn id_token(&self) -> Option<&str> {
		self.id_token.as_deref()
	}

	/// Granted scope string.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Granted scopes split on whitespace.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		self.scope.as_deref().unwrap_or_default().split_whitespace()
	}

	/// Additional response parameters.
	pub fn additional_parameters(&self) -> &AdditionalParameters {
		&self.additional_parameters
	}

	/// Serializes the response, embedding the full originating request.
	pub fn json_serialize(&self) -> JsonObject {
		let mut json = JsonObject::new();

		json::put(&mut json, KEY_REQUEST, self.request.json_serialize());
		json::put_if_some(&mut json, PARAM_STATE, self.state.as_deref());
		json::put_if_some(&mut json, PARAM_TOKEN_TYPE, self.token_type.as_deref());
		json::put_if_some(&mut json, PARAM_CODE, self.authorization_code.as_deref());
		json::put_if_some(&mut json, PARAM_ACCESS_TOKEN, self.access_token.as_deref());
		json::put_if_some(
			&mut json,
			KEY_EXPIRES_AT,
			self.access_token_expiration_time.map(unix_millis),
		);
		json::put_if_some(&mut json, PARAM_ID_TOKEN, self.id_token.as_deref());
		json::put_if_some(&mut json, PARAM_SCOPE, self.scope.as_deref());
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
		if json.get(KEY_REQUEST).is_none_or(Value::is_null) {
			return Err(Error::invalid_argument(
				"authorization request not provided and not found in JSON",
			));
		}

		let request = AuthorizationRequest::json_deserialize(json::get_object(json, KEY_REQUEST)?)?;

		Self::json_deserialize_with_request(json, request)
	}

	/// String form of [`json_deserialize`](Self::json_deserialize).
	pub fn json_deserialize_str(json: &str) -> Result<Self> {
		Self::json_deserialize(&json::parse_object(json)?)
	}

	/// Reads a response and associates it with `request`, ignoring any embedded request.
	pub fn json_deserialize_with_request(
		json: &JsonObject,
		request: AuthorizationRequest,
	) -> Result<Self> {
		let expiration = json::get_i64_if_defined(json, KEY_EXPIRES_AT)?
			.map(|millis| {
				OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
					.map_err(|_| JsonError::InvalidTimestamp { key: KEY_EXPIRES_AT.into() })
			})
			.transpose()?;
		let response = Self::builder(request)
			.state(json::get_string_if_defined(json, PARAM_STATE)?.as_deref())?
			.token_type(json::get_string_if_defined(json, PARAM_TOKEN_TYPE)?.as_deref())?
			.authorization_code(json::get_string_if_defined(json, PARAM_CODE)?.as_deref())?
			.access_token(json::get_string_if_defined(json, PARAM_ACCESS_TOKEN)?.as_deref())?
			.access_token_expiration_time(expiration)
			.id_token(json::get_string_if_defined(json, PARAM_ID_TOKEN)?.as_deref())?
			.scope(json::get_string_if_defined(json, PARAM_SCOPE)?.as_deref())?
			.additional_parameters(json::get_string_map(json, KEY_ADDITIONAL_PARAMETERS)?.iter())?
			.build();

		Ok(response)
	}

	/// Wraps the serialized response into a [`DataCarrier`].
	pub fn to_carrier(&self) -> DataCarrier {
		let mut carrier = DataCarrier::new();

		carrier.put_extra(AUTHORIZATION_RESPONSE_EXTRA, self.json_serialize_string());

		carrier
	}

	/// Extracts a response previously stored with [`to_carrier`](Self::to_carrier).
	pub fn from_carrier(carrier: &DataCarrier) -> Result<Self> {
		let raw = carrier.extra(AUTHORIZATION_RESPONSE_EXTRA).ok_or_else(|| {
			Error::invalid_argument("carrier does not contain an authorization response")
		})?;

		Self::json_deserialize_str(raw)
	}
}
impl Debug for AuthorizationResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

		f.debug_struct("AuthorizationResponse")
			.field("request", &self.request)
			.field("state", &self.state)
			.field("token_type", &self.token_type)
			.field("authorization_code", &redact(&self.authorization_code))
			.field("access_token", &redact(&self.access_token))
			.field("access_token_expiration_time", &self.access_token_expiration_time)
			.field("id_token", &redact(&self.id_token))
			.field("scope", &self.scope)
			.field("additional_parameters", &self.additional_parameters)
			.finish()
	}
}

/// Builder for [`AuthorizationResponse`] values.
#[derive(Clone, Debug)]
pub struct AuthorizationResponseBuilder {
	response: AuthorizationResponse,
}
impl AuthorizationResponseBuilder {
	/// Creates an empty builder for a response to `request`.
	pub fn new(request: AuthorizationRequest) -> Self {
		Self {
			response: AuthorizationResponse {
				request,
				state: None,
				token_type: None,
				authorization_code: None,
				access_token: None,
				access_token_expiration_time: None,
				id_token: None,
				scope: None,
				additional_parameters: AdditionalParameters::new(),
			},
		}
	}

	/// Populates every field from the redirect URI query.
	///
	/// `expires_in` is converted into an absolute instant relative to `now`; every non-reserved
	/// query parameter becomes an additional parameter.
	pub fn redirect_uri(mut self, uri: &Url, now: OffsetDateTime) -> Result<Self> {
		let mut additional = Vec::new();

		for (key, value) in uri.query_pairs() {
			let value = Some(&*value);

			self = match &*key {
				PARAM_STATE => self.state(value)?,
				PARAM_TOKEN_TYPE => self.token_type(value)?,
				PARAM_CODE => self.authorization_code(value)?,
				PARAM_ACCESS_TOKEN => self.access_token(value)?,
				PARAM_EXPIRES_IN => {
					let seconds = value.unwrap_or_default().parse::<i64>().map_err(|_| {
						Error::invalid_argument("expires_in must be an integer number of seconds")
					})?;

					self.access_token_expires_in(Duration::seconds(seconds), now)?
				},
				PARAM_ID_TOKEN => self.id_token(value)?,
				PARAM_SCOPE => self.scope(value)?,
				other => {
					additional.push((other.to_owned(), value.unwrap_or_default().to_owned()));

					self
				},
			};
		}

		self.additional_parameters(additional)
	}

	/// Sets or clears `state`.
	pub fn state(mut self, state: Option<&str>) -> Result<Self> {
		self.response.state = validate::optional_non_empty(state, PARAM_STATE)?;

		Ok(self)
	}

	/// Sets or clears the token type.
	pub fn token_type(mut self, token_type: Option<&str>) -> Result<Self> {
		self.response.token_type = validate::optional_non_empty(token_type, PARAM_TOKEN_TYPE)?;

		Ok(self)
	}

	/// Sets or clears the authorization code.
	pub fn authorization_code(mut self, code: Option<&str>) -> Result<Self> {
		self.response.authorization_code = validate::optional_non_empty(code, PARAM_CODE)?;

		Ok(self)
	}

	/// Sets or clears the access token.
	pub fn access_token(mut self, access_token: Option<&str>) -> Result<Self> {
		self.response.access_token =
			validate::optional_non_empty(access_token, PARAM_ACCESS_TOKEN)?;

		Ok(self)
	}

	/// Sets the absolute access token expiry.
	pub fn access_token_expiration_time(mut self, expires_at: Option<OffsetDateTime>) -> Self {
		self.response.access_token_expiration_time = expires_at;

		self
	}

	/// Sets the access token expiry relative to `now`; fails when the instant is unrepresentable.
	pub fn access_token_expires_in(
		self,
		expires_in: Duration,
		now: OffsetDateTime,
	) -> Result<Self> {
		let expires_at = now
			.checked_add(expires_in)
			.ok_or_else(|| Error::invalid_argument("expires_in is out of range"))?;

		Ok(self.access_token_expiration_time(Some(expires_at)))
	}

	/// Sets or clears the ID token.
	pub fn id_token(mut self, id_token: Option<&str>) -> Result<Self> {
		self.response.id_token = validate::optional_non_empty(id_token, PARAM_ID_TOKEN)?;

		Ok(self)
	}

	/// Sets or clears the granted scope.
	pub fn scope(mut self, scope: Option<&str>) -> Result<Self> {
		self.response.scope = validate::optional_non_empty(scope, PARAM_SCOPE)?;

		Ok(self)
	}

	/// Replaces the additional parameters; response parameter names are rejected.
	pub fn additional_parameters<I, K, V>(mut self, params: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.response.additional_parameters =
			params::check_additional_params(params, BUILT_IN_PARAMS)?;

		Ok(self)
	}

	/// Produces the immutable response.
	pub fn build(self) -> AuthorizationResponse {
		self.response
	}
}

fn unix_millis(instant: OffsetDateTime) -> i64 {
	(instant.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::{config::ServiceConfiguration, error::ErrorKind};

	fn request() -> AuthorizationRequest {
		let configuration = ServiceConfiguration::new(
			Url::parse("https://idp.example/authorize").expect("Authorization URL should parse."),
			Url::parse("https://idp.example/token").expect("Token URL should parse."),
		);

		AuthorizationRequest::builder(configuration, "client1", "code", "https://app.example/cb")
			.and_then(|b| b.state(Some("s-1")))
			.expect("Request fixture should be valid.")
			.build()
	}

	#[test]
	fn redirect_uri_populates_fields() {
		let now = datetime!(2024-01-01 00:00 UTC);
		let uri = Url::parse(
			"https://app.example/cb?state=s-1&code=abc&expires_in=3600&access_token=at&extra=1",
		)
		.expect("Redirect URI should parse.");
		let response = AuthorizationResponse::builder(request())
			.redirect_uri(&uri, now)
			.expect("Redirect URI should populate the builder.")
			.build();

		assert_eq!(response.state(), Some("s-1"));
		assert_eq!(response.authorization_code(), Some("abc"));
		assert_eq!(response.access_token(), Some("at"));
		assert_eq!(response.access_token_expiration_time(), Some(datetime!(2024-01-01 01:00 UTC)));
		assert_eq!(response.additional_parameters().get("extra"), Some("1"));
		assert!(!format!("{response:?}").contains("abc"));
	}

	#[test]
	fn non_numeric_expires_in_is_rejected() {
		let uri = Url::parse("https://app.example/cb?expires_in=soon")
			.expect("Redirect URI should parse.");
		let err = AuthorizationResponse::builder(request())
			.redirect_uri(&uri, OffsetDateTime::UNIX_EPOCH)
			.expect_err("Non-numeric expiry must fail.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[test]
	fn out_of_range_expires_in_is_rejected() {
		for seconds in [i64::MAX, i64::MIN] {
			let uri = Url::parse(&format!("https://app.example/cb?code=abc&expires_in={seconds}"))
				.expect("Redirect URI should parse.");
			let err = AuthorizationResponse::builder(request())
				.redirect_uri(&uri, datetime!(2024-01-01 00:00 UTC))
				.expect_err("Unrepresentable expiry must fail.");

			assert_eq!(err.kind(), ErrorKind::InvalidArgument);
		}
	}

	#[test]
	fn json_round_trip_keeps_expiry_and_request() {
		let response = AuthorizationResponse::builder(request())
			.state(Some("s-1"))
			.and_then(|b| b.authorization_code(Some("abc")))
			.and_then(|b| b.scope(Some("openid email")))
			.expect("Builder chain should succeed.")
			.access_token_expiration_time(Some(datetime!(2024-01-01 01:00:00.250 UTC)))
			.build();
		let json = response.json_serialize();

		assert_eq!(json.get("expires_at"), Some(&Value::from(1_704_070_800_250_i64)));
		assert_eq!(
			AuthorizationResponse::json_deserialize(&json).expect("Response should deserialize."),
			response
		);
		assert_eq!(response.scopes().collect::<Vec<_>>(), ["openid", "email"]);
	}

	#[test]
	fn missing_request_is_invalid_argument() {
		let err = AuthorizationResponse::json_deserialize_str(r#"{"state":"s-1"}"#)
			.expect_err("Embedded request is required.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[test]
	fn carrier_round_trip() {
		let response = AuthorizationResponse::builder(request())
			.authorization_code(Some("abc"))
			.expect("Code should be accepted.")
			.build();
		let carrier = response.to_carrier();

		assert!(contains_authorization_response(&carrier));
		assert_eq!(
			AuthorizationResponse::from_carrier(&carrier).expect("Carrier should hold a response."),
			response
		);
		assert!(AuthorizationResponse::from_carrier(&DataCarrier::new()).is_err());
	}
}
