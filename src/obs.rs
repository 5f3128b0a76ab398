//! Optional observability helpers for grant flows and resource calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `lyft_rides.flow` with the `flow`
//!   (grant) and `stage` (call site) fields, plus a debug event per resource call.
//! - Enable `metrics` to increment `lyft_rides_flow_total` for every flow attempt/success/failure,
//!   labeled by `flow` + `outcome`, and `lyft_rides_api_request_total` for every resource call,
//!   labeled by `method` + `outcome`.
//!
//! Secrets never reach either sink; credentials are identified by
//! [`TokenSecret::fingerprint`](crate::auth::TokenSecret::fingerprint).

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization Code grant (URL building and code exchange).
	AuthorizationCode,
	/// Credential refresh through the owning grant.
	Refresh,
	/// Client Credentials grant.
	ClientCredentials,
	/// Token revocation.
	Revoke,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::ClientCredentials => "client_credentials",
			FlowKind::Revoke => "revoke",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow or resource call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto [`FlowOutcome::Success`] or [`FlowOutcome::Failure`].
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure }
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records one finished resource call on every enabled sink.
pub fn record_api_call(method: &str, path: &str, status: Option<u16>, outcome: FlowOutcome) {
	self::metrics::count_api_call(method, outcome);
	self::tracing::trace_api_call(method, path, status, outcome);
}
