//! Ride, estimate, and profile endpoints.
//!
//! Each method validates its arguments before touching the network and returns the decoded
//! [`Response`].

// crates.io
use reqwest::Method;
// self
use super::{
	ApiClient, ApiRequest, Location, Response, RideHistoryQuery, RideRating, RideRequest,
	RideStatus,
	params::{require_non_empty, validate_coordinates},
};
use crate::{_prelude::*, error::ValidationError};

impl ApiClient {
	/// Ride types offered at a location (`GET v1/ridetypes`).
	pub async fn get_ride_types(
		&self,
		lat: f64,
		lng: f64,
		ride_type: Option<&str>,
	) -> Result<Response> {
		validate_coordinates(lat, lng, "lat", "lng")?;
		validate_ride_type(ride_type)?;

		let request = ApiRequest::get("v1/ridetypes", vec!["v1", "ridetypes"])
			.query("lat", lat)
			.query("lng", lng)
			.query_opt("ride_type", ride_type);

		self.send(request).await
	}

	/// Pickup time estimates near a location (`GET v1/eta`).
	pub async fn get_pickup_time_estimates(
		&self,
		lat: f64,
		lng: f64,
		ride_type: Option<&str>,
	) -> Result<Response> {
		validate_coordinates(lat, lng, "lat", "lng")?;
		validate_ride_type(ride_type)?;

		let request = ApiRequest::get("v1/eta", vec!["v1", "eta"])
			.query("lat", lat)
			.query("lng", lng)
			.query_opt("ride_type", ride_type);

		self.send(request).await
	}

	/// Cost estimates between two points (`GET v1/cost`).
	///
	/// The end coordinates are optional but must be given together.
	pub async fn get_cost_estimates(
		&self,
		start_lat: f64,
		start_lng: f64,
		end_lat: Option<f64>,
		end_lng: Option<f64>,
		ride_type: Option<&str>,
	) -> Result<Response> {
		validate_coordinates(start_lat, start_lng, "start_lat", "start_lng")?;

		let end = match (end_lat, end_lng) {
			(Some(lat), Some(lng)) => {
				validate_coordinates(lat, lng, "end_lat", "end_lng")?;

				Some((lat, lng))
			},
			(None, None) => None,
			_ =>
				return Err(
					ValidationError::IncompletePair { first: "end_lat", second: "end_lng" }.into()
				),
		};

		validate_ride_type(ride_type)?;

		let request = ApiRequest::get("v1/cost", vec!["v1", "cost"])
			.query("start_lat", start_lat)
			.query("start_lng", start_lng)
			.query_opt("end_lat", end.map(|(lat, _)| lat))
			.query_opt("end_lng", end.map(|(_, lng)| lng))
			.query_opt("ride_type", ride_type);

		self.send(request).await
	}

	/// Nearby drivers (`GET v1/drivers`).
	pub async fn get_drivers(&self, lat: f64, lng: f64) -> Result<Response> {
		validate_coordinates(lat, lng, "lat", "lng")?;

		let request = ApiRequest::get("v1/drivers", vec!["v1", "drivers"])
			.query("lat", lat)
			.query("lng", lng);

		self.send(request).await
	}

	/// Requests a ride on behalf of the user (`POST v1/rides`).
	pub async fn request_ride(&self, ride: &RideRequest) -> Result<Response> {
		ride.validate()?;

		let request = ApiRequest::new(Method::POST, "v1/rides", vec!["v1", "rides"]).json(ride)?;

		self.send(request).await
	}

	/// Status, location, and driver of a ride (`GET v1/rides/{id}`).
	pub async fn get_ride_details(&self, ride_id: &str) -> Result<Response> {
		require_non_empty(ride_id, "ride_id")?;

		self.send(ApiRequest::get("v1/rides/{id}", vec!["v1", "rides", ride_id])).await
	}

	/// Changes the destination of an ongoing ride (`PUT v1/rides/{id}/destination`).
	pub async fn update_ride(&self, ride_id: &str, destination: &Location) -> Result<Response> {
		require_non_empty(ride_id, "ride_id")?;
		destination.validate("lat", "lng")?;

		let request = ApiRequest::new(
			Method::PUT,
			"v1/rides/{id}/destination",
			vec!["v1", "rides", ride_id, "destination"],
		)
		.json(destination)?;

		self.send(request).await
	}

	/// Cancels a ride (`POST v1/rides/{id}/cancel`).
	///
	/// Late cancellations answer with a fee and a `token`; pass it back as
	/// `cancel_confirmation_token` to confirm.
	pub async fn cancel_ride(
		&self,
		ride_id: &str,
		cancel_confirmation_token: Option<&str>,
	) -> Result<Response> {
		#[derive(Serialize)]
		struct CancelBody<'a> {
			#[serde(skip_serializing_if = "Option::is_none")]
			cancel_confirmation_token: Option<&'a str>,
		}

		require_non_empty(ride_id, "ride_id")?;

		if let Some(token) = cancel_confirmation_token {
			require_non_empty(token, "cancel_confirmation_token")?;
		}

		let request = ApiRequest::new(
			Method::POST,
			"v1/rides/{id}/cancel",
			vec!["v1", "rides", ride_id, "cancel"],
		)
		.json(&CancelBody { cancel_confirmation_token })?;

		self.send(request).await
	}

	/// Rates a finished ride and optionally tips the driver (`PUT v1/rides/{id}/rating`).
	pub async fn rate_tip_ride(&self, ride_id: &str, rating: &RideRating) -> Result<Response> {
		require_non_empty(ride_id, "ride_id")?;
		rating.validate()?;

		let request = ApiRequest::new(
			Method::PUT,
			"v1/rides/{id}/rating",
			vec!["v1", "rides", ride_id, "rating"],
		)
		.json(&rating.body())?;

		self.send(request).await
	}

	/// Charges for a finished ride (`GET v1/rides/{id}/receipt`).
	pub async fn get_ride_receipt(&self, ride_id: &str) -> Result<Response> {
		require_non_empty(ride_id, "ride_id")?;

		let request =
			ApiRequest::get("v1/rides/{id}/receipt", vec!["v1", "rides", ride_id, "receipt"]);

		self.send(request).await
	}

	/// The user's past rides (`GET v1/rides`).
	pub async fn get_user_ride_history(&self, query: &RideHistoryQuery) -> Result<Response> {
		query.validate()?;

		let mut request = ApiRequest::get("v1/rides", vec!["v1", "rides"]);

		for (name, value) in query.to_query()? {
			request = request.query(name, value);
		}

		self.send(request).await
	}

	/// Account information of the authorized user (`GET v1/profile`).
	pub async fn get_user_profile(&self) -> Result<Response> {
		self.send(ApiRequest::get("v1/profile", vec!["v1", "profile"])).await
	}

	/// Forces a sandbox ride into `status` (`PUT v1/sandbox/rides/{id}`).
	///
	/// Fails with [`ValidationError::SandboxOnly`] when the session targets production.
	pub async fn update_sandbox_ride(&self, ride_id: &str, status: RideStatus) -> Result<Response> {
		#[derive(Serialize)]
		struct StatusBody {
			status: RideStatus,
		}

		if !self.session.is_sandbox_mode() {
			return Err(ValidationError::SandboxOnly { endpoint: "v1/sandbox/rides" }.into());
		}

		require_non_empty(ride_id, "ride_id")?;

		let request = ApiRequest::new(
			Method::PUT,
			"v1/sandbox/rides/{id}",
			vec!["v1", "sandbox", "rides", ride_id],
		)
		.json(&StatusBody { status })?;

		self.send(request).await
	}
}

fn validate_ride_type(ride_type: Option<&str>) -> Result<(), ValidationError> {
	match ride_type {
		Some(ride_type) => require_non_empty(ride_type, "ride_type"),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::OAuth2Credential,
		flows::{ClientCredentialGrant, GrantConfig},
		provider::{GrantType, ProviderEndpoints},
		session::Session,
	};

	// Points at a closed local port; any request that slips past validation fails loudly.
	fn offline_client(sandbox_mode: bool) -> ApiClient {
		let endpoints = ProviderEndpoints::builder()
			.origin(Url::parse("http://127.0.0.1:9").expect("Origin fixture should parse."))
			.build()
			.expect("Endpoint fixture should build.");
		let config = GrantConfig::builder("client", "secret")
			.sandbox_mode(sandbox_mode)
			.endpoints(endpoints)
			.build()
			.expect("Config fixture should build.");
		let credential = OAuth2Credential::builder(GrantType::ClientCredentials)
			.access_token("token")
			.expires_in(Duration::hours(1))
			.build()
			.expect("Credential fixture should build.");

		ApiClient::new(Session::new(ClientCredentialGrant::new(config).into(), credential))
	}

	#[tokio::test]
	async fn cost_estimates_need_both_end_coordinates() {
		let err = offline_client(true)
			.get_cost_estimates(37.77, -122.41, Some(37.79), None, None)
			.await
			.expect_err("Half an end point must fail.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::IncompletePair { first: "end_lat", .. })
		));
	}

	#[tokio::test]
	async fn sandbox_updates_are_refused_in_production() {
		let err = offline_client(false)
			.update_sandbox_ride("ride-1", RideStatus::Accepted)
			.await
			.expect_err("Production sessions must refuse sandbox endpoints.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::SandboxOnly { endpoint: "v1/sandbox/rides" })
		));
	}

	#[tokio::test]
	async fn blank_ids_and_ride_types_are_rejected() {
		let client = offline_client(true);

		assert!(matches!(
			client.get_ride_receipt("  ").await,
			Err(Error::Validation(ValidationError::EmptyParameter { name: "ride_id" }))
		));
		assert!(matches!(
			client.get_ride_types(37.77, -122.41, Some("")).await,
			Err(Error::Validation(ValidationError::EmptyParameter { name: "ride_type" }))
		));
		assert!(matches!(
			client.get_drivers(-91.0, 0.0).await,
			Err(Error::Validation(ValidationError::OutOfRange { name: "lat", .. }))
		));
	}
}
