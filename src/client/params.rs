//! Typed request parameters for the ride endpoints.
//!
//! Every type validates itself before a request leaves the process, so a bad coordinate or rating
//! fails with [`ValidationError`] and no network traffic.

// self
use crate::{_prelude::*, error::ValidationError};

const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
const LNG_RANGE: (f64, f64) = (-180.0, 180.0);
const RATING_RANGE: (u8, u8) = (1, 5);

/// A point on the map, optionally labeled with a street address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
	/// Latitude in degrees.
	pub lat: f64,
	/// Longitude in degrees.
	pub lng: f64,
	/// Human-readable address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}
impl Location {
	/// Creates a location without an address.
	pub fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng, address: None }
	}

	/// Attaches a street address.
	pub fn with_address(mut self, address: impl Into<String>) -> Self {
		self.address = Some(address.into());

		self
	}

	pub(crate) fn validate(
		&self,
		lat_name: &'static str,
		lng_name: &'static str,
	) -> Result<(), ValidationError> {
		validate_coordinates(self.lat, self.lng, lat_name, lng_name)
	}
}

/// Body of `POST v1/rides`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RideRequest {
	/// Ride type to book (e.g. `lyft`, `lyft_plus`).
	pub ride_type: String,
	/// Pickup location.
	pub origin: Location,
	/// Drop-off location; omitted when unknown.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub destination: Option<Location>,
	/// Token acknowledging Prime Time pricing.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub primetime_confirmation_token: Option<String>,
}
impl RideRequest {
	/// Creates a request for `ride_type` picking up at `origin`.
	pub fn new(ride_type: impl Into<String>, origin: Location) -> Self {
		Self {
			ride_type: ride_type.into(),
			origin,
			destination: None,
			primetime_confirmation_token: None,
		}
	}

	/// Sets the drop-off location.
	pub fn destination(mut self, destination: Location) -> Self {
		self.destination = Some(destination);

		self
	}

	/// Confirms Prime Time pricing with the token returned by the provider.
	pub fn primetime_confirmation_token(mut self, token: impl Into<String>) -> Self {
		self.primetime_confirmation_token = Some(token.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValidationError> {
		require_non_empty(&self.ride_type, "ride_type")?;
		self.origin.validate("origin.lat", "origin.lng")?;

		if let Some(destination) = &self.destination {
			destination.validate("destination.lat", "destination.lng")?;
		}
		if let Some(token) = &self.primetime_confirmation_token {
			require_non_empty(token, "primetime_confirmation_token")?;
		}

		Ok(())
	}
}

/// Rating, tip, and feedback for a finished ride (`PUT v1/rides/{id}/rating`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RideRating {
	/// Rating from 1 to 5.
	pub rating: u8,
	/// Tip in minor currency units (e.g. `200` for two dollars).
	pub tip_amount: Option<u32>,
	/// Three-letter ISO 4217 tip currency.
	pub tip_currency: Option<String>,
	/// Free-form feedback for the driver.
	pub feedback: Option<String>,
}
impl RideRating {
	/// Creates a rating without tip or feedback.
	pub fn new(rating: u8) -> Self {
		Self { rating, tip_amount: None, tip_currency: None, feedback: None }
	}

	/// Sets the tip amount; requires [`tip_currency`](Self::tip_currency).
	pub fn tip_amount(mut self, amount: u32) -> Self {
		self.tip_amount = Some(amount);

		self
	}

	/// Sets the tip currency; requires [`tip_amount`](Self::tip_amount).
	pub fn tip_currency(mut self, currency: impl Into<String>) -> Self {
		self.tip_currency = Some(currency.into());

		self
	}

	/// Attaches feedback for the driver.
	pub fn feedback(mut self, feedback: impl Into<String>) -> Self {
		self.feedback = Some(feedback.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValidationError> {
		let (min, max) = RATING_RANGE;

		if !(min..=max).contains(&self.rating) {
			return Err(ValidationError::OutOfRange {
				name: "rating",
				value: self.rating.into(),
				min: min.into(),
				max: max.into(),
			});
		}

		match (self.tip_amount, &self.tip_currency) {
			(None, None) => Ok(()),
			(Some(_), None) | (None, Some(_)) => Err(ValidationError::IncompletePair {
				first: "tip.amount",
				second: "tip.currency",
			}),
			(Some(0), Some(_)) => Err(ValidationError::InvalidParameter {
				name: "tip.amount",
				reason: "must be greater than zero".into(),
			}),
			(Some(_), Some(currency))
				if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) =>
				Err(ValidationError::InvalidParameter {
					name: "tip.currency",
					reason: format!("expected a three-letter currency code, got `{currency}`"),
				}),
			(Some(_), Some(_)) => Ok(()),
		}
	}

	pub(crate) fn body(&self) -> RatingBody<'_> {
		let tip = self.tip_amount.zip(self.tip_currency.as_deref()).map(|(amount, currency)| {
			TipBody { amount, currency: currency.to_ascii_uppercase() }
		});

		RatingBody { rating: self.rating, tip, feedback: self.feedback.as_deref() }
	}
}

#[derive(Debug, Serialize)]
pub(crate) struct RatingBody<'a> {
	rating: u8,
	#[serde(skip_serializing_if = "Option::is_none")]
	tip: Option<TipBody>,
	#[serde(skip_serializing_if = "Option::is_none")]
	feedback: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TipBody {
	amount: u32,
	currency: String,
}

/// Query of `GET v1/rides`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RideHistoryQuery {
	/// Only rides starting after this instant.
	pub start_time: OffsetDateTime,
	/// Only rides starting before this instant.
	pub end_time: Option<OffsetDateTime>,
	/// Maximum number of rides returned (provider default is 10).
	pub limit: Option<u32>,
}
impl RideHistoryQuery {
	/// Rides starting after `start_time`.
	pub fn since(start_time: OffsetDateTime) -> Self {
		Self { start_time, end_time: None, limit: None }
	}

	/// Upper bound on the ride start time.
	pub fn until(mut self, end_time: OffsetDateTime) -> Self {
		self.end_time = Some(end_time);

		self
	}

	/// Caps the number of returned rides.
	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValidationError> {
		if self.limit == Some(0) {
			return Err(ValidationError::InvalidParameter {
				name: "limit",
				reason: "must be greater than zero".into(),
			});
		}
		if self.end_time.is_some_and(|end| end < self.start_time) {
			return Err(ValidationError::InvalidParameter {
				name: "end_time",
				reason: "must not precede start_time".into(),
			});
		}

		Ok(())
	}

	pub(crate) fn to_query(&self) -> Result<Vec<(&'static str, String)>, ValidationError> {
		let mut query = vec![("start_time", rfc3339(self.start_time, "start_time")?)];

		if let Some(end_time) = self.end_time {
			query.push(("end_time", rfc3339(end_time, "end_time")?));
		}
		if let Some(limit) = self.limit {
			query.push(("limit", limit.to_string()));
		}

		Ok(query)
	}
}

/// Ride states the sandbox lets callers force a ride into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideStatus {
	/// Waiting for a driver.
	#[serde(rename = "pending")]
	Pending,
	/// Driver assigned.
	#[serde(rename = "accepted")]
	Accepted,
	/// Driver at the pickup location.
	#[serde(rename = "arrived")]
	Arrived,
	/// Passenger in the car.
	#[serde(rename = "pickedUp")]
	PickedUp,
	/// Ride finished.
	#[serde(rename = "droppedOff")]
	DroppedOff,
	/// Ride canceled.
	#[serde(rename = "canceled")]
	Canceled,
}
impl RideStatus {
	/// Wire representation.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Accepted => "accepted",
			Self::Arrived => "arrived",
			Self::PickedUp => "pickedUp",
			Self::DroppedOff => "droppedOff",
			Self::Canceled => "canceled",
		}
	}
}
impl Display for RideStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

pub(crate) fn validate_coordinates(
	lat: f64,
	lng: f64,
	lat_name: &'static str,
	lng_name: &'static str,
) -> Result<(), ValidationError> {
	check_range(lat, lat_name, LAT_RANGE)?;
	check_range(lng, lng_name, LNG_RANGE)
}

pub(crate) fn require_non_empty(value: &str, name: &'static str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		return Err(ValidationError::EmptyParameter { name });
	}

	Ok(())
}

fn check_range(
	value: f64,
	name: &'static str,
	(min, max): (f64, f64),
) -> Result<(), ValidationError> {
	// NaN fails `contains`, infinities fall outside the bounds.
	if (min..=max).contains(&value) {
		Ok(())
	} else {
		Err(ValidationError::OutOfRange { name, value, min, max })
	}
}

fn rfc3339(instant: OffsetDateTime, name: &'static str) -> Result<String, ValidationError> {
	instant.format(&time::format_description::well_known::Rfc3339).map_err(|e| {
		ValidationError::InvalidParameter { name, reason: e.to_string() }
	})
}
