//! Resource client signing ride API calls with the session's bearer token.
//!
//! [`ApiClient`] checks the session credential before every call. An expired credential is
//! refreshed through the flow that minted it while holding the session's refresh guard, so
//! concurrent callers on one session trigger a single refresh and then share its result.

pub mod params;
pub mod response;

mod rides;

pub use params::*;
pub use response::*;

// crates.io
use reqwest::{
	Method,
	header::{ACCEPT, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::OAuth2Credential,
	error::{ApiError, ConfigError},
	http,
	oauth,
	obs::{self, FlowOutcome},
	session::Session,
};

/// Async client for the ride endpoints.
///
/// Cloning is cheap; clones share the same [`Session`].
#[derive(Clone, Debug)]
pub struct ApiClient {
	session: Arc<Session>,
}
impl ApiClient {
	/// Creates a client over a session (owned or already shared).
	pub fn new(session: impl Into<Arc<Session>>) -> Self {
		Self { session: session.into() }
	}

	/// Session backing the client.
	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// Refreshes the credential now, regardless of its expiry, and returns the replacement.
	pub async fn refresh_oauth_credential(&self) -> Result<Arc<OAuth2Credential>> {
		let _guard = self.session.refresh_guard().lock().await;
		let current = self.session.credential();

		self.refresh_locked(&current).await
	}

	/// Revokes the session's current access token at the provider.
	pub async fn revoke_oauth_credential(&self) -> Result<()> {
		let credential = self.session.credential();

		self.session.flow().revoke_credential(&credential).await
	}

	/// Returns a credential that is valid right now, refreshing it first when it expired.
	async fn ensure_fresh_credential(&self) -> Result<Arc<OAuth2Credential>> {
		let credential = self.session.credential();

		if !credential.is_expired() {
			return Ok(credential);
		}

		let _guard = self.session.refresh_guard().lock().await;
		// Another caller may have refreshed while this one waited for the guard.
		let credential = self.session.credential();

		if !credential.is_expired() {
			return Ok(credential);
		}

		self.refresh_locked(&credential).await
	}

	// Callers must hold the refresh guard.
	async fn refresh_locked(&self, current: &OAuth2Credential) -> Result<Arc<OAuth2Credential>> {
		let metrics = self.session.refresh_metrics();

		metrics.record_attempt();

		match self.session.flow().refresh_credential(current).await {
			Ok(refreshed) => {
				metrics.record_success();
				self.session.replace_credential(refreshed);

				Ok(self.session.credential())
			},
			Err(e) => {
				metrics.record_failure();

				Err(e)
			},
		}
	}

	async fn send(&self, request: ApiRequest<'_>) -> Result<Response> {
		let credential = self.ensure_fresh_credential().await?;
		let url = self.resource_url(&request.segments)?;
		let method = request.method.clone();
		let mut builder = self
			.session
			.flow()
			.config()
			.http_client
			.request(request.method, url)
			.bearer_auth(credential.access_token.expose())
			.header(ACCEPT, HeaderValue::from_static("application/json"));

		if !request.query.is_empty() {
			builder = builder.query(&request.query);
		}
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		let result = execute(builder).await;
		let status = match &result {
			Ok(response) => Some(response.status),
			Err(e) => e.status(),
		};

		obs::record_api_call(method.as_str(), request.endpoint, status, FlowOutcome::of(&result));

		result
	}

	fn resource_url(&self, segments: &[&str]) -> Result<Url> {
		let mut resource = self.session.flow().config().api_base().clone();

		resource
			.path_segments_mut()
			.map_err(|_| ConfigError::ResourcePath {
				path: segments.join("/"),
				source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(resource)
	}
}

/// One resource call: method, path segments, query, and optional JSON body.
#[derive(Debug)]
struct ApiRequest<'a> {
	method: Method,
	// Path template used as the log and metric label so ride ids stay out of both.
	endpoint: &'static str,
	segments: Vec<&'a str>,
	query: Vec<(&'static str, String)>,
	body: Option<serde_json::Value>,
}
impl<'a> ApiRequest<'a> {
	fn new(method: Method, endpoint: &'static str, segments: Vec<&'a str>) -> Self {
		Self { method, endpoint, segments, query: Vec::new(), body: None }
	}

	fn get(endpoint: &'static str, segments: Vec<&'a str>) -> Self {
		Self::new(Method::GET, endpoint, segments)
	}

	fn query(mut self, name: &'static str, value: impl ToString) -> Self {
		self.query.push((name, value.to_string()));

		self
	}

	fn query_opt(self, name: &'static str, value: Option<impl ToString>) -> Self {
		match value {
			Some(value) => self.query(name, value),
			None => self,
		}
	}

	fn json(mut self, body: &impl Serialize) -> Result<Self> {
		self.body = Some(serde_json::to_value(body).map_err(ConfigError::RequestBody)?);

		Ok(self)
	}
}

async fn execute(builder: reqwest::RequestBuilder) -> Result<Response> {
	let response = builder.send().await.map_err(oauth::map_reqwest_error)?;
	let status = response.status().as_u16();
	let retry_after = http::parse_retry_after(response.headers());
	let body = response.bytes().await.map_err(ApiError::from)?;

	if !(200..300).contains(&status) {
		return Err(ApiError::from_response(status, retry_after, &body).into());
	}

	Ok(Response::from_body(status, &body)?)
}
