// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for credential refreshes performed on behalf of a session.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of refreshes sent to the provider.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that replaced the session credential.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refreshes.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn counters_accumulate_independently() {
		let metrics = RefreshMetrics::default();

		metrics.record_attempt();
		metrics.record_attempt();
		metrics.record_success();
		metrics.record_failure();

		assert_eq!((metrics.attempts(), metrics.successes(), metrics.failures()), (2, 1, 1));
	}
}
