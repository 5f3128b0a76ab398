mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, macros::datetime};
// self
use common::*;
use lyft_rides::{
	auth::OAuth2Credential,
	client::{ApiClient, Location, RideHistoryQuery, RideRating, RideRequest, RideStatus},
	error::{ApiError, Error, ErrorDetail, ValidationError},
	flows::AuthFlow,
	provider::GrantType,
	session::Session,
};

const BEARER: &str = "Bearer user-access";

fn client(server: &MockServer, sandbox_mode: bool) -> ApiClient {
	let config = test_grant_config(server, &["public", "rides.request"], sandbox_mode);
	let flow = AuthFlow::from(lyft_rides::flows::AuthorizationCodeGrant::new(config));
	let credential = OAuth2Credential::builder(GrantType::AuthorizationCode)
		.access_token("user-access")
		.refresh_token("user-refresh")
		.expires_in(Duration::hours(1))
		.build()
		.expect("Credential fixture should build.");

	ApiClient::new(Session::new(flow, credential))
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_network() {
	let server = MockServer::start_async().await;
	let any = server
		.mock_async(|_, then| {
			then.status(200).json_body(json!({}));
		})
		.await;
	let client = client(&server, true);

	assert!(matches!(
		client.get_ride_types(123.0, 0.0, None).await,
		Err(Error::Validation(ValidationError::OutOfRange { name: "lat", .. }))
	));
	assert!(matches!(
		client.get_pickup_time_estimates(0.0, f64::NAN, None).await,
		Err(Error::Validation(ValidationError::OutOfRange { name: "lng", .. }))
	));
	assert!(matches!(
		client.get_cost_estimates(37.7, -122.4, None, Some(-122.5), None).await,
		Err(Error::Validation(ValidationError::IncompletePair { .. }))
	));
	assert!(matches!(
		client.request_ride(&RideRequest::new("lyft", Location::new(37.7, 200.0))).await,
		Err(Error::Validation(ValidationError::OutOfRange { name: "origin.lng", .. }))
	));
	assert!(matches!(
		client.get_ride_details("").await,
		Err(Error::Validation(ValidationError::EmptyParameter { name: "ride_id" }))
	));
	assert!(matches!(
		client.rate_tip_ride("ride-1", &RideRating::new(9)).await,
		Err(Error::Validation(ValidationError::OutOfRange { name: "rating", .. }))
	));

	let empty_page = RideHistoryQuery::since(datetime!(2016-01-01 00:00 UTC)).limit(0);

	assert!(matches!(
		client.get_user_ride_history(&empty_page).await,
		Err(Error::Validation(ValidationError::InvalidParameter { name: "limit", .. }))
	));

	any.assert_calls_async(0).await;
}

#[tokio::test]
async fn ride_requests_post_the_typed_body() {
	let server = MockServer::start_async().await;
	let rides = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/sandbox-api/v1/rides")
				.header("authorization", BEARER)
				.json_body(json!({
					"ride_type": "lyft",
					"origin": { "lat": 37.7763, "lng": -122.3918, "address": "185 Berry St" },
					"destination": { "lat": 37.7972, "lng": -122.4533 },
					"primetime_confirmation_token": "pt-1"
				}));
			then.status(201).json_body(json!({ "ride_id": "ride-42", "status": "pending" }));
		})
		.await;
	let request = RideRequest::new(
		"lyft",
		Location::new(37.7763, -122.3918).with_address("185 Berry St"),
	)
	.destination(Location::new(37.7972, -122.4533))
	.primetime_confirmation_token("pt-1");
	let response =
		client(&server, true).request_ride(&request).await.expect("Ride request should succeed.");

	rides.assert_async().await;

	assert_eq!(response.status, 201);
	assert_eq!(response.json["ride_id"], "ride-42");
}

#[tokio::test]
async fn ride_lifecycle_endpoints_address_the_ride() {
	let server = MockServer::start_async().await;
	let cancel = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/sandbox-api/v1/rides/ride-42/cancel")
				.json_body(json!({ "cancel_confirmation_token": "fee-ok" }));
			then.status(204);
		})
		.await;
	let rating = server
		.mock_async(|when, then| {
			when.method(PUT).path("/sandbox-api/v1/rides/ride-42/rating").json_body(json!({
				"rating": 5,
				"tip": { "amount": 200, "currency": "USD" },
				"feedback": "Smooth"
			}));
			then.status(204);
		})
		.await;
	let destination = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/sandbox-api/v1/rides/ride-42/destination")
				.json_body(json!({ "lat": 37.8, "lng": -122.4 }));
			then.status(200).json_body(json!({ "lat": 37.8, "lng": -122.4 }));
		})
		.await;
	let receipt = server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox-api/v1/rides/ride-43/receipt");
			then.status(200).json_body(json!({ "ride_id": "ride-43" }));
		})
		.await;
	let sandbox = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/sandbox-api/v1/sandbox/rides/ride-42")
				.json_body(json!({ "status": "droppedOff" }));
			then.status(200).json_body(json!({ "status": "droppedOff" }));
		})
		.await;
	let client = client(&server, true);

	let response =
		client.cancel_ride("ride-42", Some("fee-ok")).await.expect("Cancel should succeed.");

	assert_eq!(response.json, serde_json::Value::Null);

	let rating_body = RideRating::new(5).tip_amount(200).tip_currency("USD").feedback("Smooth");

	client.rate_tip_ride("ride-42", &rating_body).await.expect("Rating should succeed.");
	client
		.update_ride("ride-42", &Location::new(37.8, -122.4))
		.await
		.expect("Destination update should succeed.");
	client.get_ride_receipt("ride-43").await.expect("Receipt should succeed.");
	client
		.update_sandbox_ride("ride-42", RideStatus::DroppedOff)
		.await
		.expect("Sandbox update should succeed.");

	cancel.assert_async().await;
	rating.assert_async().await;
	destination.assert_async().await;
	receipt.assert_async().await;
	sandbox.assert_async().await;
}

#[tokio::test]
async fn ride_history_sends_rfc3339_bounds() {
	let server = MockServer::start_async().await;
	let history = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/rides")
				.query_param("start_time", "2016-01-01T00:00:00Z")
				.query_param("end_time", "2016-02-01T00:00:00Z")
				.query_param("limit", "10");
			then.status(200).json_body(json!({ "ride_history": [] }));
		})
		.await;
	let query = RideHistoryQuery::since(datetime!(2016-01-01 00:00 UTC))
		.until(datetime!(2016-02-01 00:00 UTC))
		.limit(10);
	let response = client(&server, false)
		.get_user_ride_history(&query)
		.await
		.expect("History call should succeed.");

	history.assert_async().await;

	assert_eq!(response.json["ride_history"], json!([]));
}

#[tokio::test]
async fn client_errors_carry_provider_details() {
	let server = MockServer::start_async().await;
	let cost = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sandbox-api/v1/cost")
				.query_param("start_lat", "37.7")
				.query_param("ride_type", "lyft_unknown");
			then.status(400).header("retry-after", "7").json_body(json!({
				"error": "bad_parameter",
				"error_detail": [{ "ride_type": "is not a valid ride type" }]
			}));
		})
		.await;
	let err = client(&server, true)
		.get_cost_estimates(37.7, -122.4, None, None, Some("lyft_unknown"))
		.await
		.expect_err("Bad ride type must fail.");

	cost.assert_async().await;

	let (status, code, message, details, retry_after) = match err {
		Error::Api(ApiError::Client { status, code, message, details, retry_after, .. }) =>
			(status, code, message, details, retry_after),
		other => panic!("Expected a client error, got {other:?}."),
	};

	assert_eq!(status, 400);
	assert_eq!(code.as_deref(), Some("bad_parameter"));
	assert_eq!(message, "\"ride_type\" - is not a valid ride type");
	assert_eq!(
		details,
		vec![ErrorDetail {
			parameter: "ride_type".into(),
			title: "is not a valid ride type".into()
		}]
	);
	assert_eq!(retry_after, Some(Duration::seconds(7)));
}

#[tokio::test]
async fn server_errors_keep_status_and_body() {
	let server = MockServer::start_async().await;
	let drivers = server
		.mock_async(|when, then| {
			when.method(GET).path("/sandbox-api/v1/drivers");
			then.status(503).body("upstream unavailable");
		})
		.await;
	let err = client(&server, true)
		.get_drivers(37.7, -122.4)
		.await
		.expect_err("Server errors must fail.");

	drivers.assert_async().await;

	assert_eq!(err.status(), Some(503));
	assert!(matches!(
		err,
		Error::Api(ApiError::Server { status: 503, ref body, .. })
			if body == &serde_json::Value::String("upstream unavailable".into())
	));
}

#[tokio::test]
async fn sandbox_only_endpoints_are_refused_in_production() {
	let server = MockServer::start_async().await;
	let sandbox = server
		.mock_async(|_, then| {
			then.status(200);
		})
		.await;
	let err = client(&server, false)
		.update_sandbox_ride("ride-42", RideStatus::Arrived)
		.await
		.expect_err("Production sessions must refuse sandbox endpoints.");

	sandbox.assert_calls_async(0).await;

	assert!(matches!(err, Error::Validation(ValidationError::SandboxOnly { .. })));
}
