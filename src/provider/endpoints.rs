//! Endpoint set and environment selection shared by grants and the resource client.

/// Builder API for assembling endpoint sets.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Default resource base for both environments.
pub const DEFAULT_API_BASE: &str = "https://api.lyft.com/";
/// Default authorization endpoint.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://api.lyft.com/oauth/authorize";
/// Default token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.lyft.com/oauth/token";
/// Default revocation endpoint.
pub const DEFAULT_REVOCATION_ENDPOINT: &str = "https://api.lyft.com/oauth/revoke_refresh_token";

/// Provider environment a grant and its sessions talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// Sandbox environment; rides are simulated.
	#[default]
	Sandbox,
	/// Production environment; rides dispatch real drivers.
	Production,
}
impl Environment {
	/// Maps the `sandbox_mode` flag onto an environment.
	pub fn from_sandbox_mode(sandbox_mode: bool) -> Self {
		if sandbox_mode { Self::Sandbox } else { Self::Production }
	}

	/// Returns `true` for [`Environment::Sandbox`].
	pub fn is_sandbox(self) -> bool {
		matches!(self, Self::Sandbox)
	}

	/// Label used in logs and metrics.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Sandbox => "sandbox",
			Self::Production => "production",
		}
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Validated endpoint set.
///
/// API bases always end with `/` so resource paths such as `v1/ridetypes` join beneath them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Resource base used in production mode.
	pub api_base: Url,
	/// Resource base used in sandbox mode.
	pub sandbox_api_base: Url,
	/// Authorization endpoint used by the Authorization Code grant.
	pub authorization: Url,
	/// Token endpoint used for exchanges and refreshes.
	pub token: Url,
	/// Revocation endpoint.
	pub revocation: Url,
}
impl ProviderEndpoints {
	/// Creates a new builder seeded with the provider's public endpoints.
	pub fn builder() -> ProviderEndpointsBuilder {
		ProviderEndpointsBuilder::new()
	}

	/// Resource base for the given environment.
	pub fn api_base_for(&self, environment: Environment) -> &Url {
		match environment {
			Environment::Sandbox => &self.sandbox_api_base,
			Environment::Production => &self.api_base,
		}
	}
}
