//! OAuth 2.0 grant flows that mint, refresh, and revoke credentials.
//!
//! [`AuthFlow`] is the single capability a [`Session`] keeps around: it knows how to produce the
//! first credential, how to renew it once it expires, and how to revoke it. Each variant wraps a
//! grant carrying its own [`GrantConfig`].

pub mod authorization_code;
pub mod client_credentials;
pub mod config;
pub mod refresh;

pub use authorization_code::*;
pub use client_credentials::*;
pub use config::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::OAuth2Credential,
	error::ValidationError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::Environment,
	session::Session,
};

/// One of the two supported grants.
#[derive(Clone, Debug)]
pub enum AuthFlow {
	/// App-only grant.
	ClientCredential(ClientCredentialGrant),
	/// User-delegated grant.
	AuthorizationCode(AuthorizationCodeGrant),
}
impl AuthFlow {
	/// Configuration of the wrapped grant.
	pub fn config(&self) -> &GrantConfig {
		match self {
			Self::ClientCredential(grant) => grant.config(),
			Self::AuthorizationCode(grant) => grant.config(),
		}
	}

	/// Environment the grant targets.
	pub fn environment(&self) -> Environment {
		self.config().environment()
	}

	/// Produces a [`Session`] through the wrapped grant.
	///
	/// The authorization-code variant needs the provider's redirect URL; omitting it fails with
	/// [`ValidationError::MissingParameter`].
	pub async fn get_session(&self, redirect_url: Option<&str>) -> Result<Session> {
		match self {
			Self::ClientCredential(grant) => grant.get_session().await,
			Self::AuthorizationCode(grant) => {
				let redirect_url =
					redirect_url.ok_or(ValidationError::MissingParameter { name: "redirect_url" })?;

				grant.get_session(redirect_url).await
			},
		}
	}

	/// Revokes `credential`'s access token at the provider.
	pub async fn revoke_credential(&self, credential: &OAuth2Credential) -> Result<()> {
		const KIND: FlowKind = FlowKind::Revoke;

		let span = FlowSpan::new(KIND, "revoke_credential");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				#[cfg(feature = "tracing")]
				tracing::debug!(
					access_token = %credential.access_token.fingerprint(),
					"Revoking credential."
				);

				self.config().facade(None).revoke_token(&credential.access_token).await
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}
}
impl From<ClientCredentialGrant> for AuthFlow {
	fn from(grant: ClientCredentialGrant) -> Self {
		Self::ClientCredential(grant)
	}
}
impl From<AuthorizationCodeGrant> for AuthFlow {
	fn from(grant: AuthorizationCodeGrant) -> Self {
		Self::AuthorizationCode(grant)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn authorization_code_sessions_need_a_redirect() {
		let config =
			GrantConfig::builder("client", "secret").build().expect("Config should build.");
		let flow = AuthFlow::from(AuthorizationCodeGrant::new(config));
		let err = flow.get_session(None).await.expect_err("Missing redirect must fail.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::MissingParameter { name: "redirect_url" })
		));
		assert_eq!(flow.environment(), Environment::Sandbox);
	}
}
