//! Decoded resource responses.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ApiError};

/// Successful (2xx) response from a resource endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
	/// HTTP status code.
	pub status: u16,
	/// Decoded JSON body; `null` when the provider sent no body.
	pub json: serde_json::Value,
}
impl Response {
	/// Decodes a 2xx body. Non-JSON payloads fail with [`ApiError::Decode`].
	pub fn from_body(status: u16, body: &[u8]) -> Result<Self, ApiError> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self { status, json: serde_json::Value::Null });
		}

		let mut deserializer = serde_json::Deserializer::from_slice(body);
		let json = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ApiError::Decode { status, source })?;

		Ok(Self { status, json })
	}

	/// Deserializes the body into a caller-defined type.
	///
	/// Failures report the JSON path of the offending field.
	pub fn deserialize<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(&self.json)
	}
}
