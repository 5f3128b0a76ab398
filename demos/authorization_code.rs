//! Walks through the authorization-code grant: print the consent URL, feed back a simulated
//! redirect, then call a user endpoint with the resulting session.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use lyft_rides::{
	client::ApiClient,
	flows::{AuthorizationCodeGrant, GrantConfig},
	provider::ProviderEndpoints,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=demo-code");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"user-access\",\"refresh_token\":\"user-refresh\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer user-access");
			then.status(200).json_body(json!({ "id": "demo-user", "first_name": "Ada" }));
		})
		.await;
	let endpoints = ProviderEndpoints::builder().origin(Url::parse(&server.base_url())?).build()?;
	let config = GrantConfig::builder("demo-client", "demo-secret")
		.scopes(["public", "profile", "offline"])
		.endpoints(endpoints)
		.build()?;
	let redirect_uri = Url::parse("https://app.example.com/callback")?;
	let grant = AuthorizationCodeGrant::new(config).with_redirect_uri(redirect_uri.clone());

	println!("Send the user to: {}.", grant.get_authorization_url());

	// The provider would append these to the redirect URI after the user consents.
	let mut redirect = redirect_uri;

	redirect
		.query_pairs_mut()
		.append_pair("code", "demo-code")
		.append_pair("state", grant.state_token());

	let session = grant.get_session(redirect.as_str()).await?;
	let client = ApiClient::new(session);
	let profile = client.get_user_profile().await?;

	println!("Signed in as {}.", profile.json["first_name"]);

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	Ok(())
}
