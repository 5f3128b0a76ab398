//! Runs the client-credentials grant against a local mock of the provider and lists the ride
//! types available at a sandbox location.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use lyft_rides::{
	client::ApiClient,
	flows::{ClientCredentialGrant, GrantConfig},
	provider::ProviderEndpoints,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").body_includes("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":86400,\"scope\":\"public\"}",
			);
		})
		.await;
	let ride_types_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/ridetypes").header("authorization", "Bearer demo-access");
			then.status(200).json_body(json!({
				"ride_types": [
					{ "ride_type": "lyft", "display_name": "Lyft", "seats": 4 },
					{ "ride_type": "lyft_plus", "display_name": "Lyft Plus", "seats": 6 }
				]
			}));
		})
		.await;
	let endpoints = ProviderEndpoints::builder().origin(Url::parse(&server.base_url())?).build()?;
	let config = GrantConfig::builder("demo-client", "demo-secret")
		.scopes(["public"])
		.endpoints(endpoints)
		.build()?;
	let session = ClientCredentialGrant::new(config).get_session().await?;
	let client = ApiClient::new(session);
	let response = client.get_ride_types(37.7833, -122.4167, None).await?;

	for ride_type in response.json["ride_types"].as_array().into_iter().flatten() {
		println!("{} seats {}.", ride_type["display_name"], ride_type["seats"]);
	}

	token_mock.assert_async().await;
	ride_types_mock.assert_async().await;

	Ok(())
}
