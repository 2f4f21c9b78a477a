//! OpenID Connect RP-initiated logout request.

// self
use crate::{
	_prelude::*,
	config::ServiceConfiguration,
	json::{self, JsonObject},
	params::{self, AdditionalParameters},
	pkce, validate,
};

const PARAM_ID_TOKEN_HINT: &str = "id_token_hint";
const PARAM_POST_LOGOUT_REDIRECT_URI: &str = "post_logout_redirect_uri";
const PARAM_STATE: &str = "state";
const PARAM_UI_LOCALES: &str = "ui_locales";

const KEY_CONFIGURATION: &str = "configuration";
const KEY_ID_TOKEN_HINT: &str = "idTokenHint";
const KEY_POST_LOGOUT_REDIRECT_URI: &str = "postLogoutRedirectUri";
const KEY_STATE: &str = "state";
const KEY_UI_LOCALES: &str = "uiLocales";
const KEY_ADDITIONAL_PARAMETERS: &str = "additionalParameters";

const BUILT_IN_PARAMS: &[&str] =
	&[PARAM_ID_TOKEN_HINT, PARAM_POST_LOGOUT_REDIRECT_URI, PARAM_STATE, PARAM_UI_LOCALES];

/// Returns true when `json` has the shape written by [`EndSessionRequest::json_serialize`].
pub fn is_end_session_request(json: &JsonObject) -> bool {
	json.contains_key(KEY_CONFIGURATION) && json.contains_key(KEY_POST_LOGOUT_REDIRECT_URI)
}

/// Immutable end-session request.
#[derive(Clone, PartialEq, Eq)]
pub struct EndSessionRequest {
	configuration: ServiceConfiguration,
	id_token_hint: Option<String>,
	post_logout_redirect_uri: Url,
	state: Option<String>,
	ui_locales: Option<String>,
	additional_parameters: AdditionalParameters,
}
impl EndSessionRequest {
	/// Returns a builder seeded with the mandatory properties.
	pub fn builder(
		configuration: ServiceConfiguration,
		post_logout_redirect_uri: &str,
	) -> Result<EndSessionRequestBuilder> {
		EndSessionRequestBuilder::new(configuration, post_logout_redirect_uri)
	}

	/// Service configuration the request targets.
	pub fn configuration(&self) -> &ServiceConfiguration {
		&self.configuration
	}

	/// ID token previously issued to the client.
	pub fn id_token_hint(&self) -> Option<&str> {
		self.id_token_hint.as_deref()
	}

	/// Where the provider redirects after logout.
	pub fn post_logout_redirect_uri(&self) -> &Url {
		&self.post_logout_redirect_uri
	}

	/// Opaque `state` value that must round-trip through the redirect.
	pub fn state(&self) -> Option<&str> {
		self.state.as_deref()
	}

	/// Preferred UI locales.
	pub fn ui_locales(&self) -> Option<&str> {
		self.ui_locales.as_deref()
	}

	/// Additional request parameters.
	pub fn additional_parameters(&self) -> &AdditionalParameters {
		&self.additional_parameters
	}

	/// Builds the end-session endpoint URL; fails when the configuration has none.
	pub fn to_uri(&self) -> Result<Url> {
		let mut url = self.configuration.end_session_endpoint.clone().ok_or_else(|| {
			Error::invalid_argument("service configuration has no end session endpoint")
		})?;
		let mut pairs = url.query_pairs_mut();

		if let Some(hint) = &self.id_token_hint {
			pairs.append_pair(PARAM_ID_TOKEN_HINT, hint);
		}

		pairs.append_pair(PARAM_POST_LOGOUT_REDIRECT_URI, self.post_logout_redirect_uri.as_str());

		if let Some(state) = &self.state {
			pairs.append_pair(PARAM_STATE, state);
		}
		if let Some(locales) = &self.ui_locales {
			pairs.append_pair(PARAM_UI_LOCALES, locales);
		}

		pairs.extend_pairs(self.additional_parameters.iter());

		drop(pairs);

		Ok(url)
	}

	/// Serializes the request for persistent storage or local transmission.
	pub fn json_serialize(&self) -> JsonObject {
		let mut json = JsonObject::new();

		json::put(&mut json, KEY_CONFIGURATION, self.configuration.to_json());
		json::put_if_some(&mut json, KEY_ID_TOKEN_HINT, self.id_token_hint.as_deref());
		json::put(&mut json, KEY_POST_LOGOUT_REDIRECT_URI, self.post_logout_redirect_uri.as_str());
		json::put_if_some(&mut json, KEY_STATE, self.state.as_deref());
		json::put_if_some(&mut json, KEY_UI_LOCALES, self.ui_locales.as_deref());
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
		let configuration =
			ServiceConfiguration::from_json(json::get_object(json, KEY_CONFIGURATION)?)?;
		let redirect_uri = json::get_string(json, KEY_POST_LOGOUT_REDIRECT_URI)?;
		let request = Self::builder(configuration, &redirect_uri)?
			.id_token_hint(json::get_string_if_defined(json, KEY_ID_TOKEN_HINT)?.as_deref())?
			.state(json::get_string_if_defined(json, KEY_STATE)?.as_deref())?
			.ui_locales(json::get_string_if_defined(json, KEY_UI_LOCALES)?.as_deref())?
			.additional_parameters(json::get_string_map(json, KEY_ADDITIONAL_PARAMETERS)?.iter())?
			.build();

		Ok(request)
	}

	/// String form of [`json_deserialize`](Self::json_deserialize).
	pub fn json_deserialize_str(json: &str) -> Result<Self> {
		Self::json_deserialize(&json::parse_object(json)?)
	}
}
impl Debug for EndSessionRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EndSessionRequest")
			.field("configuration", &self.configuration)
			.field("id_token_hint", &self.id_token_hint.as_ref().map(|_| "<redacted>"))
			.field("post_logout_redirect_uri", &self.post_logout_redirect_uri)
			.field("state", &self.state)
			.field("ui_locales", &self.ui_locales)
			.field("additional_parameters", &self.additional_parameters)
			.finish()
	}
}

/// Builder for [`EndSessionRequest`] values; a random `state` is generated up front.
#[derive(Clone, Debug)]
pub struct EndSessionRequestBuilder {
	request: EndSessionRequest,
}
impl EndSessionRequestBuilder {
	/// Creates a builder; the post-logout redirect URI must carry a scheme.
	pub fn new(
		configuration: ServiceConfiguration,
		post_logout_redirect_uri: &str,
	) -> Result<Self> {
		let request = EndSessionRequest {
			configuration,
			id_token_hint: None,
			post_logout_redirect_uri: validate::parse_uri(post_logout_redirect_uri)?,
			state: Some(pkce::generate_state()),
			ui_locales: None,
			additional_parameters: AdditionalParameters::new(),
		};

		Ok(Self { request })
	}

	/// Sets or clears the ID token hint.
	pub fn id_token_hint(mut self, id_token_hint: Option<&str>) -> Result<Self> {
		self.request.id_token_hint = validate::optional_non_empty(id_token_hint, "idTokenHint")?;

		Ok(self)
	}

	/// Sets or clears `state`.
	pub fn state(mut self, state: Option<&str>) -> Result<Self> {
		self.request.state = validate::optional_non_empty(state, "state")?;

		Ok(self)
	}

	/// Sets or clears the UI locales.
	pub fn ui_locales(mut self, ui_locales: Option<&str>) -> Result<Self> {
		self.request.ui_locales = validate::optional_non_empty(ui_locales, "uiLocales")?;

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
	pub fn build(self) -> EndSessionRequest {
		self.request
	}
}
