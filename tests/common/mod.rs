//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use httpmock::MockServer;
// self
use lyft_rides::{
	flows::{AuthorizationCodeGrant, ClientCredentialGrant, GrantConfig},
	http::ReqwestHttpClient,
	provider::ProviderEndpoints,
	reqwest::Client as ReqwestClient,
	url::Url,
};

pub const TEST_CLIENT_ID: &str = "test-client-id";
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";

/// Token response body without a refresh token.
pub const APP_TOKEN_BODY: &str =
	r#"{"access_token":"app-access","token_type":"Bearer","expires_in":86400,"scope":"public"}"#;

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by `httpmock`.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Endpoint set rooted at the mock server, with distinct production and sandbox API bases.
pub fn mock_endpoints(server: &MockServer) -> ProviderEndpoints {
	ProviderEndpoints::builder()
		.origin(url(&server.base_url()))
		.api_base(url(&server.url("/api/")))
		.sandbox_api_base(url(&server.url("/sandbox-api/")))
		.build()
		.expect("Mock endpoints should build.")
}

pub fn test_grant_config(server: &MockServer, scopes: &[&str], sandbox_mode: bool) -> GrantConfig {
	GrantConfig::builder(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
		.scopes(scopes.iter().copied())
		.sandbox_mode(sandbox_mode)
		.endpoints(mock_endpoints(server))
		.http_client(test_reqwest_http_client())
		.build()
		.expect("Grant config fixture should build.")
}

pub fn test_client_credential_grant(
	server: &MockServer,
	scopes: &[&str],
	sandbox_mode: bool,
) -> ClientCredentialGrant {
	ClientCredentialGrant::new(test_grant_config(server, scopes, sandbox_mode))
}

pub fn test_authorization_code_grant(
	server: &MockServer,
	scopes: &[&str],
	state: &str,
) -> AuthorizationCodeGrant {
	AuthorizationCodeGrant::new(test_grant_config(server, scopes, true)).with_state_token(state)
}

/// `Authorization` header value the token endpoint should receive for `secret`.
pub fn basic_auth_header(secret: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{TEST_CLIENT_ID}:{secret}")))
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse mock URL.")
}
