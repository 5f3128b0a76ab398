//! OAuth 2.0 credential minted by a grant exchange, plus its builder and expiry rules.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
	provider::GrantType,
};

const MAX_EXPIRY_MARGIN: Duration = Duration::seconds(60);

/// Errors produced by [`OAuth2CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the access token value is empty.
	#[error("Access token cannot be empty.")]
	EmptyAccessToken,
	/// Issued when no lifetime was configured.
	#[error("Credential lifetime must be supplied via expires_in.")]
	MissingExpiry,
	/// Issued when the lifetime is zero or negative.
	#[error("Credential lifetime must be positive, got {seconds} seconds.")]
	NonPositiveExpiry {
		/// Rejected lifetime in seconds.
		seconds: i64,
	},
	/// Issued when the expiry instant falls outside the representable calendar.
	#[error("Credential lifetime of {seconds} seconds cannot be represented as an expiry instant.")]
	ExpiryOutOfRange {
		/// Rejected lifetime in seconds.
		seconds: i64,
	},
}

/// Access token, optional refresh token, and the lifetime the provider granted.
///
/// A credential is immutable; refreshing produces a new one which replaces the old value inside a
/// [`Session`](crate::session::Session) wholesale. Deserialization goes through
/// [`OAuth2CredentialBuilder`], so restored credentials obey the same rules as minted ones.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CredentialRecord")]
pub struct OAuth2Credential {
	/// Bearer token presented on resource calls.
	pub access_token: TokenSecret,
	/// Refresh token, issued only by the authorization-code grant.
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the provider (normally `Bearer`).
	pub token_type: String,
	/// Lifetime in seconds counted from `granted_at`.
	pub expires_in_seconds: i64,
	/// Scopes granted to this credential.
	pub scope: ScopeSet,
	/// Instant the token endpoint answered.
	#[serde(with = "time::serde::rfc3339")]
	pub granted_at: OffsetDateTime,
	/// Grant that minted the credential; selects the refresh path.
	pub grant_type: GrantType,
}
impl OAuth2Credential {
	/// Returns a builder for a credential minted by the given grant.
	pub fn builder(grant_type: GrantType) -> OAuth2CredentialBuilder {
		OAuth2CredentialBuilder::new(grant_type)
	}

	/// Lifetime granted by the provider.
	pub fn expires_in(&self) -> Duration {
		Duration::seconds(self.expires_in_seconds)
	}

	/// Absolute instant after which the provider stops accepting the access token.
	///
	/// Saturates at the calendar bounds when the fields were edited past them.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.granted_at.checked_add(self.expires_in()).unwrap_or_else(|| {
			if self.expires_in_seconds.is_negative() {
				PrimitiveDateTime::MIN.assume_utc()
			} else {
				PrimitiveDateTime::MAX.assume_utc()
			}
		})
	}

	/// Safety margin subtracted from the lifetime: `min(60s, expires_in / 2)`.
	pub fn expiry_margin(&self) -> Duration {
		(self.expires_in() / 2_i32).min(MAX_EXPIRY_MARGIN)
	}

	/// Returns `true` once `instant` reaches the expiry instant minus the safety margin.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		let expires_at = self.expires_at();
		let deadline = expires_at.checked_sub(self.expiry_margin()).unwrap_or(expires_at);

		instant >= deadline
	}

	/// Checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when the provider issued a refresh token.
	pub fn has_refresh_token(&self) -> bool {
		self.refresh_token.is_some()
	}

	/// Keeps `previous`'s refresh token when this credential arrived without one.
	pub(crate) fn inherit_refresh_token(mut self, previous: &OAuth2Credential) -> Self {
		if self.refresh_token.is_none() {
			self.refresh_token = previous.refresh_token.clone();
		}

		self
	}
}
impl Debug for OAuth2Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Credential")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_in_seconds", &self.expires_in_seconds)
			.field("scope", &self.scope)
			.field("granted_at", &self.granted_at)
			.field("grant_type", &self.grant_type)
			.finish()
	}
}

/// Builder for [`OAuth2Credential`].
#[derive(Clone, Debug)]
pub struct OAuth2CredentialBuilder {
	grant_type: GrantType,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	token_type: Option<String>,
	expires_in: Option<Duration>,
	scope: ScopeSet,
	granted_at: Option<OffsetDateTime>,
}
impl OAuth2CredentialBuilder {
	fn new(grant_type: GrantType) -> Self {
		Self {
			grant_type,
			access_token: None,
			refresh_token: None,
			token_type: None,
			expires_in: None,
			scope: ScopeSet::default(),
			granted_at: None,
		}
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type (defaults to `Bearer`).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the lifetime relative to `granted_at`.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Sets the granted scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the grant instant.
	pub fn granted_at(mut self, instant: OffsetDateTime) -> Self {
		self.granted_at = Some(instant);

		self
	}

	/// Consumes the builder and produces an [`OAuth2Credential`].
	pub fn build(self) -> Result<OAuth2Credential, CredentialBuilderError> {
		let access_token = self.access_token.ok_or(CredentialBuilderError::MissingAccessToken)?;

		if access_token.is_empty() {
			return Err(CredentialBuilderError::EmptyAccessToken);
		}

		let expires_in = self.expires_in.ok_or(CredentialBuilderError::MissingExpiry)?;
		let seconds = expires_in.whole_seconds();

		if seconds <= 0 {
			return Err(CredentialBuilderError::NonPositiveExpiry { seconds });
		}

		let granted_at = self.granted_at.unwrap_or_else(OffsetDateTime::now_utc);

		if granted_at.checked_add(Duration::seconds(seconds)).is_none() {
			return Err(CredentialBuilderError::ExpiryOutOfRange { seconds });
		}

		Ok(OAuth2Credential {
			access_token,
			refresh_token: self.refresh_token,
			token_type: self.token_type.unwrap_or_else(|| "Bearer".into()),
			expires_in_seconds: seconds,
			scope: self.scope,
			granted_at,
			grant_type: self.grant_type,
		})
	}
}

/// Serialized shape of [`OAuth2Credential`], validated through the builder on the way in.
#[derive(Deserialize)]
struct CredentialRecord {
	access_token: TokenSecret,
	refresh_token: Option<TokenSecret>,
	token_type: String,
	expires_in_seconds: i64,
	#[serde(default)]
	scope: ScopeSet,
	#[serde(with = "time::serde::rfc3339")]
	granted_at: OffsetDateTime,
	grant_type: GrantType,
}
impl TryFrom<CredentialRecord> for OAuth2Credential {
	type Error = CredentialBuilderError;

	fn try_from(record: CredentialRecord) -> Result<Self, Self::Error> {
		let mut builder = OAuth2Credential::builder(record.grant_type)
			.access_token(record.access_token.expose())
			.token_type(record.token_type)
			.expires_in(Duration::seconds(record.expires_in_seconds))
			.scope(record.scope)
			.granted_at(record.granted_at);

		if let Some(refresh_token) = record.refresh_token {
			builder = builder.refresh_token(refresh_token.expose());
		}

		builder.build()
	}
}
