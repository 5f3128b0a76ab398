mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use lyft_rides::{
	client::ApiClient,
	error::{AuthError, Error},
	flows::AuthFlow,
	provider::GrantType,
};

const STATE: &str = "state-123";
const USER_TOKEN_BODY: &str = r#"{"access_token":"user-access","refresh_token":"user-refresh","token_type":"Bearer","expires_in":3600,"scope":"public rides.read offline"}"#;

#[tokio::test]
async fn authorization_code_session_reaches_user_resources() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("authorization", basic_auth_header("SANDBOX-test-client-secret"))
				.body_includes("grant_type=authorization_code")
				.body_includes("code=abc123");
			then.status(200).header("content-type", "application/json").body(USER_TOKEN_BODY);
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox-api/v1/profile")
				.header("authorization", "Bearer user-access");
			then.status(200).json_body(json!({ "id": "user-7", "first_name": "Ada" }));
		})
		.await;
	let grant = test_authorization_code_grant(&server, &["public", "rides.read", "offline"], STATE);
	let authorization_url = grant.get_authorization_url();

	assert_eq!(authorization_url.path(), "/oauth/authorize");
	assert!(
		authorization_url
			.query_pairs()
			.any(|(key, value)| key == "state" && value == STATE)
	);

	let session = grant
		.get_session("https://cb?code=abc123")
		.await
		.expect("Code exchange should succeed.");
	let credential = session.credential();

	assert_eq!(credential.access_token.expose(), "user-access");
	assert_eq!(credential.refresh_token.as_ref().map(|token| token.expose()), Some("user-refresh"));
	assert_eq!(credential.grant_type, GrantType::AuthorizationCode);
	assert!(credential.scope.contains("rides.read"));

	let response =
		ApiClient::new(session).get_user_profile().await.expect("Profile call should succeed.");

	token.assert_async().await;
	profile.assert_async().await;

	assert_eq!(response.json["first_name"], "Ada");
}

#[tokio::test]
async fn redirect_errors_never_reach_the_token_endpoint() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(USER_TOKEN_BODY);
		})
		.await;
	let flow = AuthFlow::from(test_authorization_code_grant(&server, &["public"], STATE));

	let err = flow
		.get_session(Some("https://cb?code=abc123&state=forged"))
		.await
		.expect_err("Forged state must fail.");

	assert!(matches!(err, Error::Auth(AuthError::StateMismatch)));

	let err = flow
		.get_session(Some("https://cb?error=access_denied&state=state-123"))
		.await
		.expect_err("Denied authorization must fail.");

	assert!(matches!(
		err,
		Error::Auth(AuthError::AuthorizationDenied { ref error }) if error == "access_denied"
	));

	let err = flow.get_session(Some("::not a url::")).await.expect_err("Garbage must fail.");

	assert!(matches!(err, Error::Auth(AuthError::MalformedRedirect { .. })));

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_codes_surface_as_invalid_grant() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_grant","error_description":"Code already redeemed"}"#);
		})
		.await;
	let err = test_authorization_code_grant(&server, &["public"], STATE)
		.get_session("https://cb?code=used&state=state-123")
		.await
		.expect_err("Redeemed codes must fail.");

	token.assert_async().await;

	assert!(matches!(err, Error::Auth(AuthError::InvalidGrant { status: Some(400), .. })));
}

#[tokio::test]
async fn revocation_posts_the_access_token() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(USER_TOKEN_BODY);
		})
		.await;
	let revoke = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/revoke_refresh_token")
				.header("authorization", basic_auth_header("SANDBOX-test-client-secret"))
				.body("token=user-access");
			then.status(200);
		})
		.await;
	let session = test_authorization_code_grant(&server, &["public"], STATE)
		.get_session("https://cb?code=abc123&state=state-123")
		.await
		.expect("Code exchange should succeed.");

	ApiClient::new(session).revoke_oauth_credential().await.expect("Revocation should succeed.");

	token.assert_async().await;
	revoke.assert_async().await;
}
