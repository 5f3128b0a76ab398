//! Client Credentials (2-legged) grant.
//!
//! The grant authenticates the application itself, so the resulting credential carries no
//! refresh token. Refreshing simply re-runs the exchange.

// self
use crate::{
	_prelude::*,
	auth::OAuth2Credential,
	flows::{AuthFlow, GrantConfig},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::Session,
};

/// Server-to-server grant producing app-only sessions.
#[derive(Clone, Debug)]
pub struct ClientCredentialGrant {
	config: GrantConfig,
}
impl ClientCredentialGrant {
	/// Wraps a validated configuration.
	pub fn new(config: GrantConfig) -> Self {
		Self { config }
	}

	/// Configuration backing the grant.
	pub fn config(&self) -> &GrantConfig {
		&self.config
	}

	/// Exchanges the client credentials for a token and wraps it in a [`Session`].
	pub async fn get_session(&self) -> Result<Session> {
		let credential = self.request_credential("get_session").await?;

		Ok(Session::new(AuthFlow::from(self.clone()), credential))
	}

	pub(crate) async fn request_credential(
		&self,
		stage: &'static str,
	) -> Result<OAuth2Credential> {
		const KIND: FlowKind = FlowKind::ClientCredentials;

		let span = FlowSpan::new(KIND, stage);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let facade = self.config.facade(None);

				facade.exchange_client_credentials(&self.config.scope).await
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}
}
