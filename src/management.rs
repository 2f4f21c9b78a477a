//! Stateless routing between the authorization and end-session message families.
//!
//! Hosts persist an outstanding request as JSON, hand the redirect URI back once the browser
//! returns, and ship the resulting response through a [`DataCarrier`]. The functions here pick
//! the right variant at each of those three steps.

// self
use crate::{
	_prelude::*,
	authorization::{self, AuthorizationRequest, AuthorizationResponse},
	carrier::DataCarrier,
	config::ServiceConfiguration,
	end_session::{self, EndSessionRequest, EndSessionResponse},
	json::{self, JsonObject},
	obs::{self, MessageKind, MessageSpan},
};

const PARAM_ERROR: &str = "error";
const PARAM_ERROR_DESCRIPTION: &str = "error_description";
const PARAM_ERROR_URI: &str = "error_uri";

/// Request issued through the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagementRequest {
	/// Authorization code (or hybrid) request.
	Authorization(AuthorizationRequest),
	/// RP-initiated logout request.
	EndSession(EndSessionRequest),
}
impl ManagementRequest {
	/// Message family of the request.
	pub fn kind(&self) -> MessageKind {
		match self {
			ManagementRequest::Authorization(_) => MessageKind::Authorization,
			ManagementRequest::EndSession(_) => MessageKind::EndSession,
		}
	}

	/// Service configuration the request targets.
	pub fn configuration(&self) -> &ServiceConfiguration {
		match self {
			ManagementRequest::Authorization(request) => request.configuration(),
			ManagementRequest::EndSession(request) => request.configuration(),
		}
	}

	/// `state` the redirect must echo.
	pub fn state(&self) -> Option<&str> {
		match self {
			ManagementRequest::Authorization(request) => request.state(),
			ManagementRequest::EndSession(request) => request.state(),
		}
	}

	/// URL the user agent should open.
	pub fn to_uri(&self) -> Result<Url> {
		match self {
			ManagementRequest::Authorization(request) => Ok(request.to_uri()),
			ManagementRequest::EndSession(request) => request.to_uri(),
		}
	}

	/// Serializes the wrapped request; [`request_from`] reads it back.
	pub fn json_serialize(&self) -> JsonObject {
		match self {
			ManagementRequest::Authorization(request) => request.json_serialize(),
			ManagementRequest::EndSession(request) => request.json_serialize(),
		}
	}

	/// String form of [`json_serialize`](Self::json_serialize).
	pub fn json_serialize_string(&self) -> String {
		Value::Object(self.json_serialize()).to_string()
	}
}
impl From<AuthorizationRequest> for ManagementRequest {
	fn from(request: AuthorizationRequest) -> Self {
		Self::Authorization(request)
	}
}
impl From<EndSessionRequest> for ManagementRequest {
	fn from(request: EndSessionRequest) -> Self {
		Self::EndSession(request)
	}
}

/// Response produced from a redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagementResponse {
	/// Authorization response.
	Authorization(AuthorizationResponse),
	/// End-session response.
	EndSession(EndSessionResponse),
}
impl ManagementResponse {
	/// Message family of the response.
	pub fn kind(&self) -> MessageKind {
		match self {
			ManagementResponse::Authorization(_) => MessageKind::Authorization,
			ManagementResponse::EndSession(_) => MessageKind::EndSession,
		}
	}

	/// Returned `state`.
	pub fn state(&self) -> Option<&str> {
		match self {
			ManagementResponse::Authorization(response) => response.state(),
			ManagementResponse::EndSession(response) => response.state(),
		}
	}

	/// Serializes the wrapped response together with its request.
	pub fn json_serialize(&self) -> JsonObject {
		match self {
			ManagementResponse::Authorization(response) => response.json_serialize(),
			ManagementResponse::EndSession(response) => response.json_serialize(),
		}
	}

	/// Wraps the response into a [`DataCarrier`]; [`response_from`] reads it back.
	pub fn to_carrier(&self) -> DataCarrier {
		match self {
			ManagementResponse::Authorization(response) => response.to_carrier(),
			ManagementResponse::EndSession(response) => response.to_carrier(),
		}
	}
}
impl From<AuthorizationResponse> for ManagementResponse {
	fn from(response: AuthorizationResponse) -> Self {
		Self::Authorization(response)
	}
}
impl From<EndSessionResponse> for ManagementResponse {
	fn from(response: EndSessionResponse) -> Self {
		Self::EndSession(response)
	}
}

/// Reads a persisted request, trying the authorization shape before the end-session shape.
pub fn request_from(json: &str) -> Result<ManagementRequest> {
	let guard = MessageSpan::new("management.request_from").entered();
	let json = json::parse_object(json)?;

	if authorization::is_authorization_request(&json) {
		obs::observe_entered(&guard, MessageKind::Authorization, || {
			AuthorizationRequest::json_deserialize(&json).map(Into::into)
		})
	} else if end_session::is_end_session_request(&json) {
		obs::observe_entered(&guard, MessageKind::EndSession, || {
			EndSessionRequest::json_deserialize(&json).map(Into::into)
		})
	} else {
		Err(Error::invalid_argument("JSON is neither an authorization nor an end session request"))
	}
}

/// Builds the response matching `request` from the redirect `uri`, using the current time.
pub fn response_with(request: &ManagementRequest, uri: &Url) -> Result<ManagementResponse> {
	response_with_at(request, uri, OffsetDateTime::now_utc())
}

/// Same as [`response_with`] with an explicit clock for `expires_in` conversion.
pub fn response_with_at(
	request: &ManagementRequest,
	uri: &Url,
	now: OffsetDateTime,
) -> Result<ManagementResponse> {
	let guard = MessageSpan::new("management.response_with").entered();

	obs::observe_entered(&guard, request.kind(), || {
		check_redirect_error(uri)?;

		let response: ManagementResponse = match request {
			ManagementRequest::Authorization(request) =>
				AuthorizationResponse::from_uri(request.clone(), uri, now)?.into(),
			ManagementRequest::EndSession(request) =>
				EndSessionResponse::from_uri(request.clone(), uri)?.into(),
		};

		if response.state() != request.state() {
			return Err(Error::invalid_argument(
				"state returned in the redirect does not match the request",
			));
		}
		if let (
			ManagementRequest::Authorization(request),
			ManagementResponse::Authorization(response),
		) = (request, &response)
			&& request.expects_code()
			&& response.authorization_code().is_none()
		{
			return Err(Error::invalid_argument(
				"authorization redirect is missing the code parameter",
			));
		}

		Ok(response)
	})
}

/// Reads a response from `carrier`, trying the end-session marker before the authorization one.
///
/// Fails with [`Error::InvalidArgument`] when the carrier holds neither.
pub fn response_from(carrier: &DataCarrier) -> Result<ManagementResponse> {
	let guard = MessageSpan::new("management.response_from").entered();

	if end_session::contains_end_session_response(carrier) {
		obs::observe_entered(&guard, MessageKind::EndSession, || {
			EndSessionResponse::from_carrier(carrier).map(Into::into)
		})
	} else if authorization::contains_authorization_response(carrier) {
		obs::observe_entered(&guard, MessageKind::Authorization, || {
			AuthorizationResponse::from_carrier(carrier).map(Into::into)
		})
	} else {
		Err(Error::invalid_argument(
			"carrier holds neither an authorization nor an end session response",
		))
	}
}

fn check_redirect_error(uri: &Url) -> Result<()> {
	let mut error = None;
	let mut description = None;
	let mut error_uri = None;

	for (key, value) in uri.query_pairs() {
		match &*key {
			PARAM_ERROR => error = Some(value.into_owned()),
			PARAM_ERROR_DESCRIPTION => description = Some(value.into_owned()),
			PARAM_ERROR_URI => error_uri = Some(value.into_owned()),
			_ => {},
		}
	}

	match error {
		Some(error) => Err(Error::Authorization { error, description, uri: error_uri }),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::error::ErrorKind;

	fn configuration() -> ServiceConfiguration {
		ServiceConfiguration::new(
			Url::parse("https://idp.example/authorize").expect("Authorization URL should parse."),
			Url::parse("https://idp.example/token").expect("Token URL should parse."),
		)
		.with_end_session_endpoint(
			Url::parse("https://idp.example/logout").expect("Logout URL should parse."),
		)
	}

	fn authorization_request() -> ManagementRequest {
		AuthorizationRequest::builder(configuration(), "client1", "code", "https://app.example/cb")
			.and_then(|b| b.state(Some("s-1")))
			.expect("Authorization fixture should be valid.")
			.build()
			.into()
	}

	fn end_session_request() -> ManagementRequest {
		EndSessionRequest::builder(configuration(), "https://app.example/out")
			.and_then(|b| b.state(Some("s-2")))
			.expect("End session fixture should be valid.")
			.build()
			.into()
	}

	fn redirect(raw: &str) -> Url {
		Url::parse(raw).expect("Redirect fixture should parse.")
	}

	#[test]
	fn request_from_discriminates_variants() {
		for request in [authorization_request(), end_session_request()] {
			let restored = request_from(&request.json_serialize_string())
				.expect("Persisted request should be recognized.");

			assert_eq!(restored.kind(), request.kind());
			assert_eq!(restored, request);
		}
	}

	#[test]
	fn request_from_prefers_authorization_when_both_shapes_match() {
		let request = authorization_request();
		let mut json = request.json_serialize();

		json::put(&mut json, "postLogoutRedirectUri", "https://app.example/out");

		assert!(authorization::is_authorization_request(&json));
		assert!(end_session::is_end_session_request(&json));

		let restored = request_from(&Value::Object(json).to_string())
			.expect("Ambiguous request should still be recognized.");

		assert!(matches!(restored, ManagementRequest::Authorization(_)));
		assert_eq!(restored, request);
	}

	#[test]
	fn request_from_rejects_unknown_shapes() {
		let err = request_from(r#"{"clientId":"client1"}"#).expect_err("Unknown shape must fail.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
		assert_eq!(
			request_from("[]").expect_err("Arrays are not requests.").kind(),
			ErrorKind::MalformedJson
		);
	}

	#[test]
	fn response_with_builds_matching_variant() {
		let now = datetime!(2024-01-01 00:00 UTC);
		let response = response_with_at(
			&authorization_request(),
			&redirect("https://app.example/cb?code=abc&state=s-1"),
			now,
		)
		.expect("Valid redirect should produce a response.");

		assert!(matches!(
			&response,
			ManagementResponse::Authorization(inner) if inner.authorization_code() == Some("abc")
		));

		let response =
			response_with(&end_session_request(), &redirect("https://app.example/out?state=s-2"))
				.expect("Valid logout redirect should produce a response.");

		assert_eq!(response.kind(), MessageKind::EndSession);
		assert_eq!(response.state(), Some("s-2"));
	}

	#[test]
	fn response_with_surfaces_provider_errors() {
		let err = response_with(
			&authorization_request(),
			&redirect("https://app.example/cb?error=access_denied&error_description=nope&state=s-1"),
		)
		.expect_err("Provider error must surface.");

		assert!(matches!(
			err,
			Error::Authorization { ref error, ref description, uri: None }
				if error == "access_denied" && description.as_deref() == Some("nope")
		));
	}

	#[test]
	fn response_with_rejects_unrepresentable_expiry() {
		for seconds in [i64::MAX, i64::MIN] {
			let uri = redirect(&format!(
				"https://app.example/cb?code=abc&state=s-1&expires_in={seconds}"
			));
			let err = response_with(&authorization_request(), &uri)
				.expect_err("Unrepresentable expiry must fail.");

			assert_eq!(err.kind(), ErrorKind::InvalidArgument);
		}
	}

	#[test]
	fn response_with_checks_state_and_code() {
		let err = response_with(
			&authorization_request(),
			&redirect("https://app.example/cb?code=abc&state=other"),
		)
		.expect_err("State mismatch must fail.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);

		let err =
			response_with(&authorization_request(), &redirect("https://app.example/cb?state=s-1"))
				.expect_err("Missing code must fail.");

		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[test]
	fn response_from_prefers_end_session_marker() {
		let end_session =
			response_with(&end_session_request(), &redirect("https://app.example/out?state=s-2"))
				.expect("Logout redirect should produce a response.");
		let authorization = response_with(
			&authorization_request(),
			&redirect("https://app.example/cb?code=abc&state=s-1"),
		)
		.expect("Authorization redirect should produce a response.");
		let mut carrier = authorization.to_carrier();

		assert_eq!(response_from(&carrier).expect("Carrier holds a response."), authorization);

		for (key, value) in end_session.to_carrier().extras() {
			carrier.put_extra(key, value);
		}

		assert_eq!(response_from(&carrier).expect("Carrier holds a response."), end_session);
		assert_eq!(
			response_from(&DataCarrier::new()).expect_err("Empty carrier must fail.").kind(),
			ErrorKind::InvalidArgument
		);
	}
}
