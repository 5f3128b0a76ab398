//! Session holding the current credential and the grant that minted it.

// self
use crate::{
	_prelude::*,
	auth::OAuth2Credential,
	flows::{AuthFlow, RefreshMetrics},
	provider::Environment,
};

/// Holder of exactly one [`OAuth2Credential`] at a time.
///
/// Readers get an `Arc` snapshot, so replacing the credential never invalidates a value another
/// caller is still using. The read lock is never held across `.await`.
pub struct Session {
	flow: AuthFlow,
	credential: RwLock<Arc<OAuth2Credential>>,
	refresh_guard: AsyncMutex<()>,
	refresh_metrics: RefreshMetrics,
}
impl Session {
	/// Creates a session from a flow and a credential it produced (or one restored from storage).
	pub fn new(flow: AuthFlow, credential: OAuth2Credential) -> Self {
		Self {
			flow,
			credential: RwLock::new(Arc::new(credential)),
			refresh_guard: AsyncMutex::new(()),
			refresh_metrics: RefreshMetrics::default(),
		}
	}

	/// Snapshot of the current credential.
	pub fn credential(&self) -> Arc<OAuth2Credential> {
		Arc::clone(&self.credential.read())
	}

	/// Swaps in a new credential and returns the previous one.
	pub fn replace_credential(&self, credential: OAuth2Credential) -> Arc<OAuth2Credential> {
		std::mem::replace(&mut *self.credential.write(), Arc::new(credential))
	}

	/// Grant that produced the session.
	pub fn flow(&self) -> &AuthFlow {
		&self.flow
	}

	/// Environment the session talks to.
	pub fn environment(&self) -> Environment {
		self.flow.environment()
	}

	/// Returns `true` when the session targets the sandbox.
	pub fn is_sandbox_mode(&self) -> bool {
		self.environment().is_sandbox()
	}

	/// Refresh counters for this session.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}

	/// Serializes refreshes so at most one is in flight per session.
	pub(crate) fn refresh_guard(&self) -> &AsyncMutex<()> {
		&self.refresh_guard
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("flow", &self.flow)
			.field("credential", &self.credential())
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		flows::{ClientCredentialGrant, GrantConfig},
		provider::GrantType,
	};

	fn credential(token: &str) -> OAuth2Credential {
		OAuth2Credential::builder(GrantType::ClientCredentials)
			.access_token(token)
			.expires_in(Duration::hours(1))
			.build()
			.expect("Credential fixture should build.")
	}

	fn session(sandbox_mode: bool) -> Session {
		let config = GrantConfig::builder("client", "secret")
			.sandbox_mode(sandbox_mode)
			.build()
			.expect("Config fixture should build.");

		Session::new(ClientCredentialGrant::new(config).into(), credential("first"))
	}

	#[test]
	fn replacing_keeps_outstanding_snapshots_valid() {
		let session = session(true);
		let snapshot = session.credential();
		let previous = session.replace_credential(credential("second"));

		assert_eq!(snapshot.access_token.expose(), "first");
		assert_eq!(previous.access_token.expose(), "first");
		assert_eq!(session.credential().access_token.expose(), "second");
	}

	#[test]
	fn environment_follows_the_grant() {
		assert!(session(true).is_sandbox_mode());
		assert_eq!(session(false).environment(), Environment::Production);
	}

	#[test]
	fn debug_output_stays_redacted() {
		let debug = format!("{:?}", session(true));

		assert!(!debug.contains("first"));
		assert!(!debug.contains("secret\""));
	}
}
