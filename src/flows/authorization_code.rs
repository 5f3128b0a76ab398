//! Authorization Code (3-legged) grant: authorization URL, redirect handling, and code exchange.
//!
//! The grant issues a random `state` token when constructed. The authorization URL carries it to
//! the provider, and [`AuthorizationCodeGrant::get_session`] checks it on the way back before the
//! code is exchanged.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::OAuth2Credential,
	error::AuthError,
	flows::{AuthFlow, GrantConfig},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::Session,
};

const STATE_LEN: usize = 32;

/// User-delegated grant producing sessions with refresh tokens.
#[derive(Clone)]
pub struct AuthorizationCodeGrant {
	config: GrantConfig,
	state_token: String,
	redirect_uri: Option<Url>,
	require_state: bool,
}
impl AuthorizationCodeGrant {
	/// Wraps a validated configuration and generates a fresh `state` token.
	pub fn new(config: GrantConfig) -> Self {
		Self {
			config,
			state_token: random_string(STATE_LEN),
			redirect_uri: None,
			require_state: false,
		}
	}

	/// Replaces the generated `state` token (e.g. when restoring a grant across processes).
	pub fn with_state_token(mut self, state_token: impl Into<String>) -> Self {
		self.state_token = state_token.into();

		self
	}

	/// Sets the redirect URI registered with the provider.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Rejects redirects that omit `state` when enabled (defaults to `false`).
	pub fn require_state(mut self, require: bool) -> Self {
		self.require_state = require;

		self
	}

	/// Configuration backing the grant.
	pub fn config(&self) -> &GrantConfig {
		&self.config
	}

	/// CSRF token expected back on the redirect.
	pub fn state_token(&self) -> &str {
		&self.state_token
	}

	/// Redirect URI sent to the provider, when configured.
	pub fn redirect_uri(&self) -> Option<&Url> {
		self.redirect_uri.as_ref()
	}

	/// Builds the URL end-users visit to grant access.
	///
	/// Carries `response_type=code`, `client_id`, `redirect_uri` (when set), every requested scope,
	/// and `state`. The client secret never appears in it.
	pub fn get_authorization_url(&self) -> Url {
		let mut url = self.config.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.config.client_id);

		if let Some(redirect_uri) = &self.redirect_uri {
			pairs.append_pair("redirect_uri", redirect_uri.as_str());
		}
		if !self.config.scope.is_empty() {
			pairs.append_pair("scope", &self.config.scope.normalized());
		}

		pairs.append_pair("state", &self.state_token);

		drop(pairs);

		url
	}

	/// Validates the provider's redirect and exchanges its code for a [`Session`].
	pub async fn get_session(&self, redirect_url: &str) -> Result<Session> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		let span = FlowSpan::new(KIND, "get_session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let code = self.authorization_code_from(redirect_url)?;
				let facade = self.config.facade(self.redirect_uri.as_ref());

				facade
					.exchange_authorization_code(
						&code,
						self.redirect_uri.as_ref(),
						&self.config.scope,
					)
					.await
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		Ok(Session::new(AuthFlow::from(self.clone()), result?))
	}

	/// Extracts the authorization code from a redirect URL.
	///
	/// A `state` that differs from [`state_token`](Self::state_token) is always rejected; a
	/// missing one only when [`require_state`](Self::require_state) is enabled.
	pub fn authorization_code_from(&self, redirect_url: &str) -> Result<String, AuthError> {
		let url =
			Url::parse(redirect_url).map_err(|source| AuthError::MalformedRedirect { source })?;
		let mut code = None;
		let mut error = None;
		let mut state = None;

		for (key, value) in url.query_pairs() {
			match key.as_ref() {
				"code" => code = Some(value.into_owned()),
				"error" => error = Some(value.into_owned()),
				"state" => state = Some(value.into_owned()),
				_ => {},
			}
		}

		match state {
			Some(state) if state != self.state_token => return Err(AuthError::StateMismatch),
			None if self.require_state => return Err(AuthError::MissingState),
			_ => {},
		}

		match (code.filter(|code| !code.is_empty()), error) {
			(Some(code), None) => Ok(code),
			(Some(_), Some(_)) => Err(AuthError::CodeAndError),
			(None, Some(error)) => Err(AuthError::AuthorizationDenied { error }),
			(None, None) => Err(AuthError::MissingCode),
		}
	}

	pub(crate) async fn refresh(&self, current: &OAuth2Credential) -> Result<OAuth2Credential> {
		redeem_refresh_token(&self.config, self.redirect_uri.as_ref(), current).await
	}
}
impl Debug for AuthorizationCodeGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeGrant")
			.field("config", &self.config)
			.field("state_token", &"<redacted>")
			.field("redirect_uri", &self.redirect_uri)
			.field("require_state", &self.require_state)
			.finish()
	}
}

/// Redeems `current`'s refresh token, keeping it when the provider does not rotate it.
pub(crate) async fn redeem_refresh_token(
	config: &GrantConfig,
	redirect_uri: Option<&Url>,
	current: &OAuth2Credential,
) -> Result<OAuth2Credential> {
	let refresh_token = current.refresh_token.as_ref().ok_or(AuthError::MissingRefreshToken)?;
	let refreshed = config.facade(redirect_uri).refresh_token(refresh_token, &current.scope).await?;

	Ok(refreshed.inherit_refresh_token(current))
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
