//! OAuth 2.0 grant identifiers spoken against the token endpoint.

// self
use crate::_prelude::*;

/// OAuth 2.0 grant types spoken against the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant (3-legged, user-delegated).
	AuthorizationCode,
	/// Refresh Token grant used to renew authorization-code credentials.
	RefreshToken,
	/// Client Credentials grant for app-only tokens (2-legged).
	ClientCredentials,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
