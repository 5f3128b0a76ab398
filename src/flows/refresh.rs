//! Credential refresh through the grant that minted the credential.
//!
//! The credential's own [`GrantType`] picks the path, so a credential restored into a session
//! built from the other grant still refreshes correctly. Authorization-code credentials redeem
//! their refresh token (`grant_type=refresh_token`) and keep the old refresh token when the
//! provider does not rotate it. Client-credential credentials have no refresh token, so a refresh
//! re-runs the client-credentials exchange.

mod metrics;

pub use self::metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::OAuth2Credential,
	flows::{AuthFlow, ClientCredentialGrant, authorization_code},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::GrantType,
};

const STAGE: &str = "refresh_credential";

impl AuthFlow {
	/// Obtains a replacement for `current`.
	pub async fn refresh_credential(&self, current: &OAuth2Credential) -> Result<OAuth2Credential> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, STAGE);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				#[cfg(feature = "tracing")]
				tracing::debug!(
					grant = %current.grant_type,
					access_token = %current.access_token.fingerprint(),
					expires_at = %current.expires_at(),
					"Refreshing credential."
				);

				match (current.grant_type, self) {
					(GrantType::ClientCredentials, Self::ClientCredential(grant)) =>
						grant.request_credential(STAGE).await,
					(GrantType::ClientCredentials, Self::AuthorizationCode(grant)) =>
						ClientCredentialGrant::new(grant.config().clone())
							.request_credential(STAGE)
							.await,
					(_, Self::AuthorizationCode(grant)) => grant.refresh(current).await,
					(_, Self::ClientCredential(grant)) =>
						authorization_code::redeem_refresh_token(grant.config(), None, current)
							.await,
				}
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}
}
