//! Authorization service configuration shared by every request type.
//!
//! Describes how to reach a single OAuth 2.0 / OpenID Connect provider. Instances are
//! created by hand or from an already-fetched discovery document; the network fetch
//! itself is the host's concern.

// self
use crate::{
	_prelude::*,
	error::JsonError,
	json::{self, JsonObject},
};

const KEY_AUTHORIZATION_ENDPOINT: &str = "authorizationEndpoint";
const KEY_TOKEN_ENDPOINT: &str = "tokenEndpoint";
const KEY_REGISTRATION_ENDPOINT: &str = "registrationEndpoint";
const KEY_END_SESSION_ENDPOINT: &str = "endSessionEndpoint";
const KEY_REVOCATION_ENDPOINT: &str = "revocationEndpoint";

/// Endpoint set of an authorization service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfiguration {
	/// Authorization endpoint used for interactive authorization requests.
	pub authorization_endpoint: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token_endpoint: Url,
	/// Optional dynamic client registration endpoint.
	#[serde(default)]
	pub registration_endpoint: Option<Url>,
	/// Optional RP-initiated logout endpoint.
	#[serde(default)]
	pub end_session_endpoint: Option<Url>,
	/// Optional RFC 7009 revocation endpoint.
	#[serde(default)]
	pub revocation_endpoint: Option<Url>,
}
impl ServiceConfiguration {
	/// Creates a configuration from the two mandatory endpoints.
	pub fn new(authorization_endpoint: Url, token_endpoint: Url) -> Self {
		Self {
			authorization_endpoint,
			token_endpoint,
			registration_endpoint: None,
			end_session_endpoint: None,
			revocation_endpoint: None,
		}
	}

	/// Sets the registration endpoint.
	pub fn with_registration_endpoint(mut self, url: Url) -> Self {
		self.registration_endpoint = Some(url);

		self
	}

	/// Sets the end-session endpoint.
	pub fn with_end_session_endpoint(mut self, url: Url) -> Self {
		self.end_session_endpoint = Some(url);

		self
	}

	/// Sets the revocation endpoint.
	pub fn with_revocation_endpoint(mut self, url: Url) -> Self {
		self.revocation_endpoint = Some(url);

		self
	}

	/// Serializes the configuration, omitting absent optional endpoints.
	pub fn to_json(&self) -> JsonObject {
		let mut json = JsonObject::new();

		json::put(&mut json, KEY_AUTHORIZATION_ENDPOINT, self.authorization_endpoint.as_str());
		json::put(&mut json, KEY_TOKEN_ENDPOINT, self.token_endpoint.as_str());
		json::put_if_some(
			&mut json,
			KEY_REGISTRATION_ENDPOINT,
			self.registration_endpoint.as_ref().map(Url::as_str),
		);
		json::put_if_some(
			&mut json,
			KEY_END_SESSION_ENDPOINT,
			self.end_session_endpoint.as_ref().map(Url::as_str),
		);
		json::put_if_some(
			&mut json,
			KEY_REVOCATION_ENDPOINT,
			self.revocation_endpoint.as_ref().map(Url::as_str),
		);

		json
	}

	/// Reads a configuration produced by [`to_json`](Self::to_json).
	pub fn from_json(json: &JsonObject) -> Result<Self, JsonError> {
		serde_path_to_error::deserialize(Value::Object(json.clone()))
			.map_err(JsonError::Configuration)
	}
}
