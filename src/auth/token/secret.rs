//! Secure token secret wrapper that redacts sensitive material.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const FINGERPRINT_LEN: usize = 12;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Short, non-reversible identifier that lets logs correlate a secret without revealing it.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());
		let mut encoded = URL_SAFE_NO_PAD.encode(digest);

		encoded.truncate(FINGERPRINT_LEN);

		encoded
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn fingerprint_is_stable_and_opaque() {
		let lhs = TokenSecret::new("access-token");
		let rhs = TokenSecret::new("access-token");

		assert_eq!(lhs.fingerprint(), rhs.fingerprint());
		assert_eq!(lhs.fingerprint().len(), FINGERPRINT_LEN);
		assert!(!lhs.fingerprint().contains("access"));
		assert_ne!(lhs.fingerprint(), TokenSecret::new("other-token").fingerprint());
	}

	#[test]
	fn serializes_as_plain_string_for_persistence() {
		let secret = TokenSecret::new("persist-me");

		assert_eq!(
			serde_json::to_string(&secret).expect("Secret should serialize."),
			"\"persist-me\""
		);
	}
}
