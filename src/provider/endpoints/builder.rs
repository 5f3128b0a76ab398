// self
use crate::{
	_prelude::*,
	provider::{
		DEFAULT_API_BASE, DEFAULT_AUTHORIZATION_ENDPOINT, DEFAULT_REVOCATION_ENDPOINT,
		DEFAULT_TOKEN_ENDPOINT, ProviderEndpoints,
	},
};

/// Errors raised while constructing or validating endpoint sets.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum EndpointsError {
	/// Endpoint URL could not be parsed.
	#[error("The {endpoint} endpoint URL is invalid.")]
	InvalidUrl {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS unless they target a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint cannot carry a path (e.g. `mailto:` or `data:` URLs).
	#[error("The {endpoint} endpoint cannot be used as a base URL: {url}.")]
	CannotBeABase {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`ProviderEndpoints`] values.
///
/// Unset endpoints fall back to the provider's public URLs.
#[derive(Clone, Debug, Default)]
pub struct ProviderEndpointsBuilder {
	api_base: Option<Url>,
	sandbox_api_base: Option<Url>,
	authorization: Option<Url>,
	token: Option<Url>,
	revocation: Option<Url>,
	origin: Option<Url>,
}
impl ProviderEndpointsBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Rebases every unset endpoint onto `origin` (e.g. a local mock server), keeping the
	/// provider's path layout: `oauth/authorize`, `oauth/token`, `oauth/revoke_refresh_token`,
	/// and the origin itself as the resource base.
	pub fn origin(mut self, origin: Url) -> Self {
		self.origin = Some(origin);

		self
	}

	/// Sets the production resource base.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the sandbox resource base.
	pub fn sandbox_api_base(mut self, url: Url) -> Self {
		self.sandbox_api_base = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token = Some(url);

		self
	}

	/// Sets the revocation endpoint.
	pub fn revocation_endpoint(mut self, url: Url) -> Self {
		self.revocation = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting endpoint set.
	pub fn build(self) -> Result<ProviderEndpoints, EndpointsError> {
		let origin = self.origin.map(|url| ensure_trailing_slash("origin", url)).transpose()?;
		let resolve = |endpoint: &'static str,
		               explicit: Option<Url>,
		               relative: &str,
		               default: &str|
		 -> Result<Url, EndpointsError> {
			let url = match (explicit, origin.as_ref()) {
				(Some(url), _) => url,
				(None, Some(origin)) => origin
					.join(relative)
					.map_err(|source| EndpointsError::InvalidUrl { endpoint, source })?,
				(None, None) => Url::parse(default)
					.map_err(|source| EndpointsError::InvalidUrl { endpoint, source })?,
			};

			validate_endpoint(endpoint, &url)?;

			Ok(url)
		};
		let api_base = resolve("api", self.api_base, "", DEFAULT_API_BASE)?;
		let sandbox_api_base = resolve("sandbox api", self.sandbox_api_base, "", DEFAULT_API_BASE)?;
		let authorization = resolve(
			"authorization",
			self.authorization,
			"oauth/authorize",
			DEFAULT_AUTHORIZATION_ENDPOINT,
		)?;
		let token = resolve("token", self.token, "oauth/token", DEFAULT_TOKEN_ENDPOINT)?;
		let revocation = resolve(
			"revocation",
			self.revocation,
			"oauth/revoke_refresh_token",
			DEFAULT_REVOCATION_ENDPOINT,
		)?;

		Ok(ProviderEndpoints {
			api_base: ensure_trailing_slash("api", api_base)?,
			sandbox_api_base: ensure_trailing_slash("sandbox api", sandbox_api_base)?,
			authorization,
			token,
			revocation,
		})
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), EndpointsError> {
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(EndpointsError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}

fn ensure_trailing_slash(name: &'static str, mut url: Url) -> Result<Url, EndpointsError> {
	if url.cannot_be_a_base() {
		return Err(EndpointsError::CannotBeABase { endpoint: name, url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}
