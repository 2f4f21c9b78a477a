//! OAuth 2.0 / OpenID Connect authorization request and its builder.

// self
use crate::{
	_prelude::*,
	config::ServiceConfiguration,
	json::{self, JsonObject},
	params::{self, AdditionalParameters},
	pkce::{self, CodeChallengeMethod},
	validate,
};

/// `response_type` value for the authorization code flow.
pub const RESPONSE_TYPE_CODE: &str = "code";

const PARAM_CLIENT_ID: &str = "client_id";
const PARAM_CODE_CHALLENGE: &str = "code_challenge";
const PARAM_CODE_CHALLENGE_METHOD: &str = "code_challenge_method";
const PARAM_LOGIN_HINT: &str = "login_hint";
const PARAM_NONCE: &str = "nonce";
const PARAM_PROMPT: &str = "prompt";
const PARAM_REDIRECT_URI: &str = "redirect_uri";
const PARAM_RESPONSE_MODE: &str = "response_mode";
const PARAM_RESPONSE_TYPE: &str = "response_type";
const PARAM_SCOPE: &str = "scope";
const PARAM_STATE: &str = "state";

const KEY_CONFIGURATION: &str = "configuration";
const KEY_CLIENT_ID: &str = "clientId";
const KEY_RESPONSE_TYPE: &str = "responseType";
const KEY_REDIRECT_URI: &str = "redirectUri";
const KEY_SCOPE: &str = "scope";
const KEY_STATE: &str = "state";
const KEY_NONCE: &str = "nonce";
const KEY_LOGIN_HINT: &str = "loginHint";
const KEY_PROMPT: &str = "prompt";
const KEY_RESPONSE_MODE: &str = "responseMode";
const KEY_CODE_VERIFIER: &str = "codeVerifier";
const KEY_CODE_VERIFIER_CHALLENGE: &str = "codeVerifierChallenge";
const KEY_CODE_VERIFIER_CHALLENGE_METHOD: &str = "codeVerifierChallengeMethod";
const KEY_ADDITIONAL_PARAMETERS: &str = "additionalParameters";

const BUILT_IN_PARAMS: &[&str] = &[
	PARAM_CLIENT_ID,
	PARAM_CODE_CHALLENGE,
	PARAM_CODE_CHALLENGE_METHOD,
	"display",
	PARAM_LOGIN_HINT,
	PARAM_PROMPT,
	"ui_locales",
	PARAM_REDIRECT_URI,
	PARAM_RESPONSE_MODE,
	PARAM_RESPONSE_TYPE,
	PARAM_SCOPE,
	PARAM_STATE,
	"claims",
	"claims_locales",
	PARAM_NONCE,
];

/// Returns true when `json` has the shape written by [`AuthorizationRequest::json_serialize`].
pub fn is_authorization_request(json: &JsonObject) -> bool {
	[KEY_CONFIGURATION, KEY_CLIENT_ID, KEY_RESPONSE_TYPE, KEY_REDIRECT_URI]
		.iter()
		.all(|key| json.contains_key(*key))
}

#[derive(Clone, PartialEq, Eq)]
struct Pkce {
	verifier: String,
	challenge: String,
	method: CodeChallengeMethod,
}
impl Pkce {
	fn new(verifier: String, method: CodeChallengeMethod) -> Self {
		let challenge = method.challenge(&verifier);

		Self { verifier, challenge, method }
	}
}

/// Immutable authorization request sent through the browser.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
	configuration: ServiceConfiguration,
	client_id: String,
	response_type: String,
	redirect_uri: Url,
	scope: Option<String>,
	state: Option<String>,
	nonce: Option<String>,
	login_hint: Option<String>,
	prompt: Option<String>,
	response_mode: Option<String>,
	pkce: Option<Pkce>,
	additional_parameters: AdditionalParameters,
}
impl AuthorizationRequest {
	/// Returns a builder seeded with the mandatory properties.
	pub fn builder(
		configuration: ServiceConfiguration,
		client_id: impl Into<String>,
		response_type: impl Into<String>,
		redirect_uri: &str,
	) -> Result<AuthorizationRequestBuilder> {
		AuthorizationRequestBuilder::new(configuration, client_id, response_type, redirect_uri)
	}

	/// Service configuration the request targets.
	pub fn configuration(&self) -> &ServiceConfiguration {
		&self.configuration
	}

	/// Client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Requested `response_type`.
	pub fn response_type(&self) -> &str {
		&self.response_type
	}

	/// Redirect URI the provider sends the user back to.
	pub fn redirect_uri(&self) -> &Url {
		&self.redirect_uri
	}

	/// Space-delimited scope string, if any.
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Opaque `state` value that must round-trip through the redirect.
	pub fn state(&self) -> Option<&str> {
		self.state.as_deref()
	}

	/// OpenID Connect `nonce`.
	pub fn nonce(&self) -> Option<&str> {
		self.nonce.as_deref()
	}

	/// Login hint.
	pub fn login_hint(&self) -> Option<&str> {
		self.login_hint.as_deref()
	}

	/// Prompt value.
	pub fn prompt(&self) -> Option<&str> {
		self.prompt.as_deref()
	}

	/// Response mode.
	pub fn response_mode(&self) -> Option<&str> {
		self.response_mode.as_deref()
	}

	/// PKCE code verifier. Callers must avoid logging it.
	pub fn code_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}

	/// PKCE code challenge derived from the verifier.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.challenge.as_str())
	}

	/// PKCE challenge method.
	pub fn code_challenge_method(&self) -> Option<CodeChallengeMethod> {
		self.pkce.as_ref().map(|pkce| pkce.method)
	}

	/// Additional request parameters.
	pub fn additional_parameters(&self) -> &AdditionalParameters {
		&self.additional_parameters
	}

	/// Whether the requested response type includes an authorization code.
	pub fn expects_code(&self) -> bool {
		self.response_type.split_whitespace().any(|value| value == RESPONSE_TYPE_CODE)
	}

	/// Builds the authorization endpoint URL the user agent should open.
	pub fn to_uri(&self) -> Url {
		let mut url = self.configuration.authorization_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair(PARAM_RESPONSE_TYPE, &self.response_type);
		pairs.append_pair(PARAM_CLIENT_ID, &self.client_id);
		pairs.append_pair(PARAM_REDIRECT_URI, self.redirect_uri.as_str());

		for (key, value) in [
			(PARAM_SCOPE, &self.scope),
			(PARAM_STATE, &self.state),
			(PARAM_NONCE, &self.nonce),
			(PARAM_LOGIN_HINT, &self.login_hint),
			(PARAM_PROMPT, &self.prompt),
			(PARAM_RESPONSE_MODE, &self.response_mode),
		] {
			if let Some(value) = value {
				pairs.append_pair(key, value);
			}
		}

		if let Some(pkce) = &self.pkce {
			pairs.append_pair(PARAM_CODE_CHALLENGE, &pkce.challenge);
			pairs.append_pair(PARAM_CODE_CHALLENGE_METHOD, pkce.method.as_str());
		}

		pairs.extend_pairs(self.additional_parameters.iter());

		drop(pairs);

		url
	}

	/// Serializes the request for persistent storage or local transmission.
	pub fn json_serialize(&self) -> JsonObject {
		let mut json = JsonObject::new();

		json::put(&mut json, KEY_CONFIGURATION, self.configuration.to_json());
		json::put(&mut json, KEY_CLIENT_ID, self.client_id.as_str());
		json::put(&mut json, KEY_RESPONSE_TYPE, self.response_type.as_str());
		json::put(&mut json, KEY_REDIRECT_URI, self.redirect_uri.as_str());
		json::put_if_some(&mut json, KEY_SCOPE, self.scope.as_deref());
		json::put_if_some(&mut json, KEY_STATE, self.state.as_deref());
		json::put_if_some(&mut json, KEY_NONCE, self.nonce.as_deref());
		json::put_if_some(&mut json, KEY_LOGIN_HINT, self.login_hint.as_deref());
		json::put_if_some(&mut json, KEY_PROMPT, self.prompt.as_deref());
		json::put_if_some(&mut json, KEY_RESPONSE_MODE, self.response_mode.as_deref());

		if let Some(pkce) = &self.pkce {
			json::put(&mut json, KEY_CODE_VERIFIER, pkce.verifier.as_str());
			json::put(&mut json, KEY_CODE_VERIFIER_CHALLENGE, pkce.challenge.as_str());
			json::put(&mut json, KEY_CODE_VERIFIER_CHALLENGE_METHOD, pkce.method.as_str());
		}

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
	///
	/// The challenge is re-derived from the persisted verifier and method.
	pub fn json_deserialize(json: &JsonObject) -> Result<Self> {
		let configuration =
			ServiceConfiguration::from_json(json::get_object(json, KEY_CONFIGURATION)?)?;
		let redirect_uri = json::get_string(json, KEY_REDIRECT_URI)?;
		let mut builder = Self::builder(
			configuration,
			json::get_string(json, KEY_CLIENT_ID)?,
			json::get_string(json, KEY_RESPONSE_TYPE)?,
			&redirect_uri,
		)?
		.scope(json::get_string_if_defined(json, KEY_SCOPE)?.as_deref())?
		.state(json::get_string_if_defined(json, KEY_STATE)?.as_deref())?
		.nonce(json::get_string_if_defined(json, KEY_NONCE)?.as_deref())?
		.login_hint(json::get_string_if_defined(json, KEY_LOGIN_HINT)?.as_deref())?
		.prompt(json::get_string_if_defined(json, KEY_PROMPT)?.as_deref())?
		.response_mode(json::get_string_if_defined(json, KEY_RESPONSE_MODE)?.as_deref())?
		.additional_parameters(json::get_string_map(json, KEY_ADDITIONAL_PARAMETERS)?.iter())?;

		builder = match json::get_string_if_defined(json, KEY_CODE_VERIFIER)? {
			Some(verifier) => {
				let method = json::get_string_if_defined(json, KEY_CODE_VERIFIER_CHALLENGE_METHOD)?
					.map(|raw| raw.parse::<CodeChallengeMethod>())
					.transpose()?
					.unwrap_or(CodeChallengeMethod::S256);

				builder.code_verifier_with_method(&verifier, method)?
			},
			None => builder.code_verifier(None)?,
		};

		Ok(builder.build())
	}

	/// String form of [`json_deserialize`](Self::json_deserialize).
	pub fn json_deserialize_str(json: &str) -> Result<Self> {
		Self::json_deserialize(&json::parse_object(json)?)
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("configuration", &self.configuration)
			.field("client_id", &self.client_id)
			.field("response_type", &self.response_type)
			.field("redirect_uri", &self.redirect_uri)
			.field("scope", &self.scope)
			.field("state", &self.state)
			.field("nonce", &self.nonce)
			.field("login_hint", &self.login_hint)
			.field("prompt", &self.prompt)
			.field("response_mode", &self.response_mode)
			.field("code_verifier", &self.pkce.as_ref().map(|_| "<redacted>"))
			.field("code_challenge", &self.code_challenge())
			.field("code_challenge_method", &self.code_challenge_method())
			.field("additional_parameters", &self.additional_parameters)
			.finish()
	}
}

/// Builder for [`AuthorizationRequest`] values.
///
/// A fresh `state`, `nonce`, and S256 PKCE verifier are generated up front; override or clear
/// them through the matching setters.
#[derive(Clone)]
pub struct AuthorizationRequestBuilder {
	request: AuthorizationRequest,
}
impl AuthorizationRequestBuilder {
	/// Creates a builder; fails on an empty client id or response type, or a scheme-less
	/// redirect URI.
	pub fn new(
		configuration: ServiceConfiguration,
		client_id: impl Into<String>,
		response_type: impl Into<String>,
		redirect_uri: &str,
	) -> Result<Self> {
		let request = AuthorizationRequest {
			configuration,
			client_id: validate::require_non_empty(client_id, "clientId")?,
			response_type: validate::require_non_empty(response_type, "responseType")?,
			redirect_uri: validate::parse_uri(redirect_uri)?,
			scope: None,
			state: Some(pkce::generate_state()),
			nonce: Some(pkce::generate_state()),
			login_hint: None,
			prompt: None,
			response_mode: None,
			pkce: Some(Pkce::new(pkce::generate_code_verifier(), CodeChallengeMethod::S256)),
			additional_parameters: AdditionalParameters::new(),
		};

		Ok(Self { request })
	}

	/// Sets or clears the scope string; a present scope must not be empty.
	pub fn scope(mut self, scope: Option<&str>) -> Result<Self> {
		self.request.scope = validate::optional_non_empty(scope, "scope")?;

		Ok(self)
	}

	/// Sets the scope from individual values joined by spaces; no values clears it.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let joined =
			scopes.into_iter().map(|s| s.as_ref().to_owned()).collect::<Vec<_>>().join(" ");

		self.request.scope = if joined.is_empty() { None } else { Some(joined) };

		self
	}

	/// Sets or clears `state`.
	pub fn state(mut self, state: Option<&str>) -> Result<Self> {
		self.request.state = validate::optional_non_empty(state, "state")?;

		Ok(self)
	}

	/// Sets or clears `nonce`.
	pub fn nonce(mut self, nonce: Option<&str>) -> Result<Self> {
		self.request.nonce = validate::optional_non_empty(nonce, "nonce")?;

		Ok(self)
	}

	/// Sets or clears the login hint.
	pub fn login_hint(mut self, login_hint: Option<&str>) -> Result<Self> {
		self.request.login_hint = validate::optional_non_empty(login_hint, "loginHint")?;

		Ok(self)
	}

	/// Sets or clears the prompt value.
	pub fn prompt(mut self, prompt: Option<&str>) -> Result<Self> {
		self.request.prompt = validate::optional_non_empty(prompt, "prompt")?;

		Ok(self)
	}

	/// Sets or clears the response mode.
	pub fn response_mode(mut self, response_mode: Option<&str>) -> Result<Self> {
		self.request.response_mode = validate::optional_non_empty(response_mode, "responseMode")?;

		Ok(self)
	}

	/// Sets the PKCE verifier with an S256 challenge, or disables PKCE with `None`.
	pub fn code_verifier(mut self, code_verifier: Option<&str>) -> Result<Self> {
		match code_verifier {
			Some(verifier) => self.code_verifier_with_method(verifier, CodeChallengeMethod::S256),
			None => {
				self.request.pkce = None;

				Ok(self)
			},
		}
	}

	/// Sets the PKCE verifier with an explicit challenge method.
	pub fn code_verifier_with_method(
		mut self,
		code_verifier: &str,
		method: CodeChallengeMethod,
	) -> Result<Self> {
		pkce::check_code_verifier(code_verifier)?;

		self.request.pkce = Some(Pkce::new(code_verifier.to_owned(), method));

		Ok(self)
	}

	/// Replaces the additional parameters; protocol parameter names are rejected.
	pub fn additional_parameters<I, K, V>(mut self, params: I) -> Result<Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.request.additional_parameters =
			params::check_additional_params(params, BUILT_IN_PARAMS)?;

		Ok(self)
	}

	/// Produces the immutable request.
	pub fn build(self) -> AuthorizationRequest {
		self.request
	}
}
impl Debug for AuthorizationRequestBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AuthorizationRequestBuilder").field(&self.request).finish()
	}
}
