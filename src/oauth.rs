//! Conversions into the `oauth2` crate's endpoint and credential types.
//!
//! Hosts that drive the network leg with `oauth2` can hand built messages straight to its
//! client without re-validating URLs or secrets.

pub use oauth2;

// crates.io
use oauth2::{
	AuthUrl, ClientId, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeVerifier, RedirectUrl,
	RevocationUrl, TokenUrl, basic::BasicClient,
};
// self
use crate::{
	authorization::AuthorizationRequest, config::ServiceConfiguration,
	revocation::TokenRevocationRequest,
};

/// `oauth2` client with the authorization and token endpoints configured.
pub type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

impl ServiceConfiguration {
	/// Authorization endpoint as an [`AuthUrl`].
	pub fn auth_url(&self) -> AuthUrl {
		AuthUrl::from_url(self.authorization_endpoint.clone())
	}

	/// Token endpoint as a [`TokenUrl`].
	pub fn token_url(&self) -> TokenUrl {
		TokenUrl::from_url(self.token_endpoint.clone())
	}

	/// Revocation endpoint as a [`RevocationUrl`], when configured.
	pub fn revocation_url(&self) -> Option<RevocationUrl> {
		self.revocation_endpoint.clone().map(RevocationUrl::from_url)
	}
}

impl AuthorizationRequest {
	/// Client identifier as a [`ClientId`].
	pub fn oauth2_client_id(&self) -> ClientId {
		ClientId::new(self.client_id().to_owned())
	}

	/// PKCE verifier for the code exchange, when PKCE is enabled.
	pub fn pkce_verifier(&self) -> Option<PkceCodeVerifier> {
		self.code_verifier().map(|verifier| PkceCodeVerifier::new(verifier.to_owned()))
	}

	/// `state` as a [`CsrfToken`].
	pub fn csrf_token(&self) -> Option<CsrfToken> {
		self.state().map(|state| CsrfToken::new(state.to_owned()))
	}

	/// `oauth2` client targeting the same provider, client id, and redirect URI.
	pub fn oauth2_client(&self) -> ConfiguredBasicClient {
		BasicClient::new(self.oauth2_client_id())
			.set_auth_uri(self.configuration().auth_url())
			.set_token_uri(self.configuration().token_url())
			.set_redirect_uri(RedirectUrl::from_url(self.redirect_uri().clone()))
	}
}

impl TokenRevocationRequest {
	/// Client identifier as a [`ClientId`].
	pub fn oauth2_client_id(&self) -> ClientId {
		ClientId::new(self.client_id().to_owned())
	}

	/// PKCE verifier sent alongside the token, when present.
	pub fn pkce_verifier(&self) -> Option<PkceCodeVerifier> {
		self.code_verifier().map(|verifier| PkceCodeVerifier::new(verifier.to_owned()))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::PkceCodeChallenge;
	// self
	use super::*;
	use crate::_prelude::*;

	fn configuration() -> ServiceConfiguration {
		ServiceConfiguration::new(
			Url::parse("https://idp.example/authorize").expect("Authorization URL should parse."),
			Url::parse("https://idp.example/token").expect("Token URL should parse."),
		)
	}

	#[test]
	fn configuration_maps_to_endpoint_newtypes() {
		let configuration = configuration();

		assert_eq!(configuration.auth_url().as_str(), "https://idp.example/authorize");
		assert_eq!(configuration.token_url().as_str(), "https://idp.example/token");
		assert!(configuration.revocation_url().is_none());

		let configuration = configuration.with_revocation_endpoint(
			Url::parse("https://idp.example/revoke").expect("Revocation URL should parse."),
		);

		assert_eq!(
			configuration.revocation_url().map(|url| url.as_str().to_owned()).as_deref(),
			Some("https://idp.example/revoke")
		);
	}

	#[test]
	fn authorization_challenge_matches_oauth2() {
		let request = AuthorizationRequest::builder(
			configuration(),
			"client1",
			"code",
			"https://app.example/cb",
		)
		.expect("Builder fixture should be valid.")
		.build();
		let verifier = request.pkce_verifier().expect("PKCE is enabled by default.");
		let challenge = PkceCodeChallenge::from_code_verifier_sha256(&verifier);

		assert_eq!(Some(challenge.as_str()), request.code_challenge());
		assert_eq!(request.oauth2_client_id().as_str(), "client1");
		assert_eq!(request.oauth2_client().client_id().as_str(), "client1");
		assert_eq!(request.csrf_token().map(|t| t.secret().len()), Some(32));
	}

	#[test]
	fn revocation_request_exposes_credentials() {
		let verifier = "a".repeat(43);
		let request = TokenRevocationRequest::builder(configuration(), "client1")
			.and_then(|b| b.code_verifier(Some(&verifier)))
			.expect("Builder fixture should be valid.")
			.build();

		assert_eq!(request.oauth2_client_id().as_str(), "client1");
		assert_eq!(request.pkce_verifier().map(|v| v.secret().to_owned()), Some(verifier));
	}
}
