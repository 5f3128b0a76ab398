//! Grant configuration shared by both OAuth 2.0 grants.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	error::{ConfigError, ValidationError},
	http::ReqwestHttpClient,
	oauth::BasicFacade,
	provider::{Environment, ProviderEndpoints},
};

/// Prefix the provider expects on client secrets used against the sandbox.
pub const SANDBOX_SECRET_PREFIX: &str = "SANDBOX-";

/// Client identity, requested scopes, target environment, and transport for one grant.
#[derive(Clone, Debug)]
pub struct GrantConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret as issued by the provider (without the sandbox prefix).
	pub client_secret: TokenSecret,
	/// Scopes requested from the provider.
	pub scope: ScopeSet,
	/// Selects the sandbox environment when `true` (the default).
	pub sandbox_mode: bool,
	/// Token, authorization, revocation, and resource endpoints.
	pub endpoints: ProviderEndpoints,
	/// HTTP client used for token requests and resource calls.
	pub http_client: ReqwestHttpClient,
}
impl GrantConfig {
	/// Creates a new builder for the given client credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> GrantConfigBuilder {
		GrantConfigBuilder::new(client_id, client_secret)
	}

	/// Environment selected by `sandbox_mode`.
	pub fn environment(&self) -> Environment {
		Environment::from_sandbox_mode(self.sandbox_mode)
	}

	/// Resource base for the configured environment.
	pub fn api_base(&self) -> &Url {
		self.endpoints.api_base_for(self.environment())
	}

	/// Secret presented to the token endpoint; prefixed with `SANDBOX-` in sandbox mode.
	pub fn effective_client_secret(&self) -> TokenSecret {
		let secret = self.client_secret.expose();

		if self.sandbox_mode && !secret.starts_with(SANDBOX_SECRET_PREFIX) {
			TokenSecret::new(format!("{SANDBOX_SECRET_PREFIX}{secret}"))
		} else {
			self.client_secret.clone()
		}
	}

	pub(crate) fn facade(&self, redirect_uri: Option<&Url>) -> BasicFacade {
		BasicFacade::new(
			&self.endpoints,
			&self.client_id,
			self.effective_client_secret(),
			redirect_uri,
			self.http_client.clone(),
		)
	}
}

/// Builder for [`GrantConfig`].
#[derive(Clone, Debug)]
pub struct GrantConfigBuilder {
	client_id: String,
	client_secret: TokenSecret,
	scopes: Vec<String>,
	sandbox_mode: bool,
	endpoints: Option<ProviderEndpoints>,
	http_client: Option<ReqwestHttpClient>,
}
impl GrantConfigBuilder {
	fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			scopes: Vec::new(),
			sandbox_mode: true,
			endpoints: None,
			http_client: None,
		}
	}

	/// Adds scopes to request (e.g. `public`, `rides.read`, `offline`).
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Toggles the sandbox environment (defaults to `true`).
	pub fn sandbox_mode(mut self, sandbox_mode: bool) -> Self {
		self.sandbox_mode = sandbox_mode;

		self
	}

	/// Overrides the endpoint set (defaults to the provider's public endpoints).
	pub fn endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
		self.endpoints = Some(endpoints);

		self
	}

	/// Supplies the HTTP client; timeouts and proxies come from it.
	pub fn http_client(mut self, http_client: impl Into<ReqwestHttpClient>) -> Self {
		self.http_client = Some(http_client.into());

		self
	}

	/// Consumes the builder and validates the configuration.
	pub fn build(self) -> Result<GrantConfig> {
		if self.client_id.trim().is_empty() {
			return Err(ValidationError::EmptyParameter { name: "client_id" }.into());
		}
		if self.client_secret.is_empty() {
			return Err(ValidationError::EmptyParameter { name: "client_secret" }.into());
		}

		let scope = ScopeSet::new(self.scopes).map_err(ValidationError::from)?;
		let endpoints = match self.endpoints {
			Some(endpoints) => endpoints,
			None => ProviderEndpoints::builder().build().map_err(ConfigError::from)?,
		};

		Ok(GrantConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			scope,
			sandbox_mode: self.sandbox_mode,
			endpoints,
			http_client: self.http_client.unwrap_or_default(),
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn sandbox_mode_defaults_on_and_prefixes_the_secret() {
		let config = GrantConfig::builder("client", "secret")
			.scopes(["public", "rides.read"])
			.build()
			.expect("Config should build.");

		assert!(config.sandbox_mode);
		assert_eq!(config.environment(), Environment::Sandbox);
		assert_eq!(config.effective_client_secret().expose(), "SANDBOX-secret");
		assert_eq!(config.scope.normalized(), "public rides.read");

		let already = GrantConfig::builder("client", "SANDBOX-secret")
			.build()
			.expect("Prefixed config should build.");

		assert_eq!(already.effective_client_secret().expose(), "SANDBOX-secret");
	}

	#[test]
	fn production_mode_sends_the_secret_verbatim() {
		let config = GrantConfig::builder("client", "secret")
			.sandbox_mode(false)
			.build()
			.expect("Config should build.");

		assert_eq!(config.environment(), Environment::Production);
		assert_eq!(config.effective_client_secret().expose(), "secret");
		assert_eq!(config.api_base().as_str(), "https://api.lyft.com/");
	}

	#[test]
	fn builder_rejects_blank_credentials_and_bad_scopes() {
		let err = GrantConfig::builder(" ", "secret").build().expect_err("Blank id must fail.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::EmptyParameter { name: "client_id" })
		));

		let err = GrantConfig::builder("client", "").build().expect_err("Blank secret must fail.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::EmptyParameter { name: "client_secret" })
		));

		let err = GrantConfig::builder("client", "secret")
			.scopes(["rides read"])
			.build()
			.expect_err("Whitespace scopes must fail.");

		assert!(matches!(err, Error::Validation(ValidationError::InvalidScope(_))));
	}

	#[test]
	fn debug_output_redacts_the_secret() {
		let config =
			GrantConfig::builder("client", "very-secret").build().expect("Config should build.");

		assert!(!format!("{config:?}").contains("very-secret"));
	}
}
