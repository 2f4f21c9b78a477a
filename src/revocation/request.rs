//! RFC 7009 token revocation request and its builder.

// self
use crate::{
	_prelude::*,
	config::ServiceConfiguration,
	json::{self, JsonObject},
	obs::{self, MessageKind},
	params::{self, AdditionalParameters},
	pkce, validate,
};

/// Form parameter carrying the client identifier.
pub const PARAM_CLIENT_ID: &str = "client_id";
/// Form parameter carrying the redirect URI.
pub const PARAM_REDIRECT_URI: &str = "redirect_uri";
/// Form parameter carrying the token to revoke.
pub const PARAM_TOKEN: &str = "token";
/// Form parameter carrying the PKCE code verifier.
pub const PARAM_CODE_VERIFIER: &str = "code_verifier";

const KEY_CONFIGURATION: &str = "configuration";
const KEY_CLIENT_ID: &str = "clientId";
const KEY_REDIRECT_URI: &str = "redirectUri";
const KEY_TOKEN: &str = "token";
const KEY_ADDITIONAL_PARAMETERS: &str = "additionalParameters";

// `code_verifier` is reserved alongside the persisted fields so form keys never have two sources.
const BUILT_IN_PARAMS: &[&str] =
	&[PARAM_CLIENT_ID, PARAM_REDIRECT_URI, PARAM_TOKEN, PARAM_CODE_VERIFIER];

/// Immutable token revocation request.
///
/// The code verifier is carried for the revocation call itself but is never part of the
/// persisted JSON form.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRevocationRequest {
	configuration: ServiceConfiguration,
	client_id: String,
	redirect_uri: Option<Url>,
	token: Option<String>,
	code_verifier: Option<String>,
	additional_parameters: AdditionalParameters,
}
impl TokenRevocationRequest {
	/// Returns a builder seeded with the mandatory properties.
	pub fn builder(
		configuration: ServiceConfiguration,
		client_id: impl Into<String>,
	) -> Result<TokenRevocationRequestBuilder> {
		TokenRevocationRequestBuilder::new(configuration, client_id)
	}

	/// Service configuration the request targets.
	pub fn configuration(&self) -> &ServiceConfiguration {
		&self.configuration
	}

	/// Client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Redirect URI, if set.
	pub fn redirect_uri(&self) -> Option<&Url> {
		self.redirect_uri.as_ref()
	}

	/// Token to revoke, if set. Callers must avoid logging it.
	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	/// PKCE code verifier, if set.
	pub fn code_verifier(&self) -> Option<&str> {
		self.code_verifier.as_deref()
	}

	/// Additional request parameters.
	pub fn additional_parameters(&self) -> &AdditionalParameters {
		&self.additional_parameters
	}

	/// Flat parameter list for the revocation POST body.
	///
	/// Protocol parameters come first (`redirect_uri`, `token`, `code_verifier`), followed by the
	/// additional parameters. Keys never repeat because additional parameters cannot reuse a
	/// protocol name.
	pub fn request_parameters(&self) -> Vec<(String, String)> {
		let mut params = Vec::with_capacity(3 + self.additional_parameters.len());

		if let Some(uri) = &self.redirect_uri {
			params.push((PARAM_REDIRECT_URI.to_owned(), uri.to_string()));
		}
		if let Some(token) = &self.token {
			params.push((PARAM_TOKEN.to_owned(), token.clone()));
		}
		if let Some(verifier) = &self.code_verifier {
			params.push((PARAM_CODE_VERIFIER.to_owned(), verifier.clone()));
		}

		params.extend(self.additional_parameters.iter().map(|(k, v)| (k.to_owned(), v.to_owned())));

		params
	}

	/// Encodes [`request_parameters`](Self::request_parameters) as an
	/// `application/x-www-form-urlencoded` body.
	pub fn to_form_body(&self) -> String {
		url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.request_parameters())
			.finish()
	}

	/// Serializes the request for persistent storage or local transmission.
	pub fn json_serialize(&self) -> JsonObject {
		let mut json = JsonObject::new();

		json::put(&mut json, KEY_CONFIGURATION, self.configuration.to_json());
		json::put(&mut json, KEY_CLIENT_ID, self.client_id.as_str());
		json::put_if_some(&mut json, KEY_REDIRECT_URI, self.redirect_uri.as_ref().map(Url::as_str));
		json::put_if_some(&mut json, KEY_TOKEN, self.token.as_deref());
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

	/// Reads a request produced by [`json_serialize`](Self::json_serialize).
	pub fn json_deserialize(json: &JsonObject) -> Result<Self> {
		obs::observe(MessageKind::Revocation, "revocation_request.json_deserialize", || {
			let configuration =
				ServiceConfiguration::from_json(json::get_object(json, KEY_CONFIGURATION)?)?;
			let client_id = json::get_string(json, KEY_CLIENT_ID)?;
			let redirect_uri = json::get_url_if_defined(json, KEY_REDIRECT_URI)?;
			let token = json::get_string_if_defined(json, KEY_TOKEN)?;
			let additional = json::get_string_map(json, KEY_ADDITIONAL_PARAMETERS)?;

			Ok(Self::builder(configuration, client_id)?
				.redirect_uri(redirect_uri.as_ref().map(Url::as_str))?
				.token(token.as_deref())?
				.additional_parameters(additional.iter())?
				.build())
		})
	}

	/// Reads a request from the string form produced by
	/// [`json_serialize_string`](Self::json_serialize_string).
	pub fn json_deserialize_str(json: &str) -> Result<Self> {
		Self::json_deserialize(&json::parse_object(json)?)
	}
}
impl Debug for TokenRevocationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRevocationRequest")
			.field("configuration", &self.configuration)
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri)
			.field("token", &self.token.as_ref().map(|_| "<redacted>"))
			.field("code_verifier", &self.code_verifier.as_ref().map(|_| "<redacted>"))
			.field("additional_parameters", &self.additional_parameters)
			.finish()
	}
}

/// Builder for [`TokenRevocationRequest`] values.
///
/// Every setter validates its input immediately, so [`build`](Self::build) cannot fail. The
/// builder is consumed on build; clone it first to produce several requests.
#[derive(Clone, Debug)]
pub struct TokenRevocationRequestBuilder {
	configuration: ServiceConfiguration,
	client_id: String,
	redirect_uri: Option<Url>,
	token: Option<String>,
	code_verifier: Option<String>,
	additional_parameters: AdditionalParameters,
}
impl TokenRevocationRequestBuilder {
	/// Creates a builder; fails when `client_id` is empty.
	pub fn new(configuration: ServiceConfiguration, client_id: impl Into<String>) -> Result<Self> {
		Ok(Self {
			configuration,
			client_id: validate::require_non_empty(client_id, "clientId")?,
			redirect_uri: None,
			token: None,
			code_verifier: None,
			additional_parameters: AdditionalParameters::new(),
		})
	}

	/// Replaces the service configuration.
	pub fn configuration(mut self, configuration: ServiceConfiguration) -> Self {
		self.configuration = configuration;

		self
	}

	/// Replaces the client identifier, which must not be empty.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Result<Self> {
		self.client_id = validate::require_non_empty(client_id, "clientId")?;

		Ok(self)
	}

	/// Sets or clears the redirect URI; a present URI must have a scheme.
	pub fn redirect_uri(mut self, redirect_uri: Option<&str>) -> Result<Self> {
		self.redirect_uri = validate::parse_optional_uri(redirect_uri)?;

		Ok(self)
	}

	/// Sets or clears the token to revoke; a present token must not be empty.
	pub fn token(mut self, token: Option<&str>) -> Result<Self> {
		self.token = validate::optional_non_empty(token, "token")?;

		Ok(self)
	}

	/// Sets or clears the PKCE code verifier; a present verifier must satisfy RFC 7636.
	pub fn code_verifier(mut self, code_verifier: Option<&str>) -> Result<Self> {
		if let Some(verifier) = code_verifier {
			pkce::check_code_verifier(verifier)?;
		}

		self.code_verifier = code_verifier.map(str::to_owned);

		Ok(self)
	}

	/// Replaces the additional parameters; protocol parameter names are rejected.
	pub fn additional_parameters<I, K, V>(mut self, params: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.additional_parameters = params::check_additional_params(params, BUILT_IN_PARAMS)?;

		Ok(self)
	}

	/// Produces the immutable request.
	pub fn build(self) -> TokenRevocationRequest {
		TokenRevocationRequest {
			configuration: self.configuration,
			client_id: self.client_id,
			redirect_uri: self.redirect_uri,
			token: self.token,
			code_verifier: self.code_verifier,
			additional_parameters: self.additional_parameters,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{ErrorKind, FormatError};

	const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

	fn configuration() -> ServiceConfiguration {
		ServiceConfiguration::new(
			Url::parse("https://idp.example/authorize").expect("Authorization URL should parse."),
			Url::parse("https://idp.example/token").expect("Token URL should parse."),
		)
	}

	fn builder() -> TokenRevocationRequestBuilder {
		TokenRevocationRequest::builder(configuration(), "client1")
			.expect("Builder fixture should be valid.")
	}

	#[test]
	fn empty_client_id_is_rejected() {
		let err = TokenRevocationRequest::builder(configuration(), "")
			.expect_err("Empty client id must be rejected.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
		assert!(builder().client_id("").is_err());
	}

	#[test]
	fn redirect_uri_requires_scheme() {
		let err = builder()
			.redirect_uri(Some("app.example/callback"))
			.expect_err("Scheme-less URI must be rejected.");

		assert!(matches!(err, Error::Format(FormatError::MissingScheme { .. })));

		let request = builder()
			.redirect_uri(Some("https://app.example/callback"))
			.expect("URI with scheme should be accepted.")
			.build();

		assert_eq!(
			request.redirect_uri().map(Url::as_str),
			Some("https://app.example/callback")
		);
		let cleared = builder().redirect_uri(None).expect("Clearing is valid.").build();

		assert!(cleared.redirect_uri().is_none());
	}

	#[test]
	fn token_rules() {
		assert!(builder().token(Some("")).is_err());
		assert_eq!(builder().token(None).expect("Null token is valid.").build().token(), None);
		assert_eq!(
			builder().token(Some("abc123")).expect("Token should be accepted.").build().token(),
			Some("abc123")
		);
	}

	#[test]
	fn code_verifier_is_checked() {
		let err = builder().code_verifier(Some("short")).expect_err("Short verifier must fail.");

		assert_eq!(err.kind(), ErrorKind::Format);
		assert_eq!(
			builder()
				.code_verifier(Some(VERIFIER))
				.expect("Verifier is valid.")
				.build()
				.code_verifier(),
			Some(VERIFIER)
		);
	}

	#[test]
	fn reserved_additional_parameters_are_rejected() {
		for key in ["client_id", "redirect_uri", "token", "code_verifier"] {
			let err = builder()
				.additional_parameters([(key, "x")])
				.expect_err("Reserved parameter must be rejected.");

			assert!(matches!(err, Error::ReservedParameter { .. }), "{key} must be reserved.");
		}
	}

	#[test]
	fn request_parameters_are_ordered_and_unique() {
		let request = builder()
			.redirect_uri(Some("https://app.example/callback"))
			.and_then(|b| b.token(Some("tok-xyz")))
			.and_then(|b| b.code_verifier(Some(VERIFIER)))
			.and_then(|b| b.additional_parameters([("token_type_hint", "refresh_token")]))
			.expect("Builder chain should succeed.")
			.build();
		let keys = request.request_parameters().into_iter().map(|(k, _)| k).collect::<Vec<_>>();

		assert_eq!(keys, ["redirect_uri", "token", "code_verifier", "token_type_hint"]);
		assert_eq!(
			request.to_form_body(),
			"redirect_uri=https%3A%2F%2Fapp.example%2Fcallback&token=tok-xyz&code_verifier=dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk&token_type_hint=refresh_token"
		);
	}

	#[test]
	fn json_round_trip_drops_code_verifier() {
		let request = builder()
			.token(Some("tok-xyz"))
			.and_then(|b| b.code_verifier(Some(VERIFIER)))
			.and_then(|b| b.additional_parameters([("audience", "api")]))
			.expect("Builder chain should succeed.")
			.build();
		let restored =
			TokenRevocationRequest::json_deserialize_str(&request.json_serialize_string())
				.expect("Serialized request should deserialize.");

		assert_eq!(restored.client_id(), "client1");
		assert_eq!(restored.token(), Some("tok-xyz"));
		assert_eq!(restored.code_verifier(), None);
		assert_eq!(restored.additional_parameters(), request.additional_parameters());
		assert_eq!(restored.configuration(), request.configuration());
	}

	#[test]
	fn json_serialize_always_writes_additional_parameters() {
		let json = builder().build().json_serialize();

		assert_eq!(json.get(KEY_ADDITIONAL_PARAMETERS), Some(&Value::Object(JsonObject::new())));
		assert!(!json.contains_key(KEY_TOKEN));
		assert!(!json.contains_key(KEY_REDIRECT_URI));
	}

	#[test]
	fn missing_required_keys_are_malformed_json() {
		let err = TokenRevocationRequest::json_deserialize_str(r#"{"clientId":"client1"}"#)
			.expect_err("Configuration is required.");

		assert_eq!(err.kind(), ErrorKind::MalformedJson);

		let mut json = builder().build().json_serialize();

		json.remove(KEY_CLIENT_ID);

		let err =
			TokenRevocationRequest::json_deserialize(&json).expect_err("Client id is required.");

		assert_eq!(err.kind(), ErrorKind::MalformedJson);
	}

	#[test]
	fn debug_redacts_secrets() {
		let request =
			builder().token(Some("tok-secret")).expect("Token should be accepted.").build();

		assert!(!format!("{request:?}").contains("tok-secret"));
	}
}
