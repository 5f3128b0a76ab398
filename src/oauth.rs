//! Internal facade over the `oauth2` crate: token exchanges, revocation, and error mapping.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, Scope, TokenResponse,
	TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialBuilderError, OAuth2Credential, ScopeSet, TokenSecret},
	error::{ApiError, AuthError, ConfigError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{GrantType, ProviderEndpoints},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Token-endpoint failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenErrorKind {
	InvalidGrant,
	InvalidClient,
	InsufficientScope,
	Rejected,
}

/// Client-authenticated access to the token and revocation endpoints.
///
/// Token requests authenticate with HTTP Basic (`client_id`, `client_secret`).
#[derive(Clone)]
pub(crate) struct BasicFacade {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	client_id: String,
	client_secret: TokenSecret,
	revocation: Url,
}
impl BasicFacade {
	pub(crate) fn new(
		endpoints: &ProviderEndpoints,
		client_id: &str,
		client_secret: TokenSecret,
		redirect_uri: Option<&Url>,
		http_client: ReqwestHttpClient,
	) -> Self {
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_auth_uri(AuthUrl::from_url(endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(endpoints.token.clone()));

		if let Some(redirect) = redirect_uri {
			oauth_client = oauth_client.set_redirect_uri(RedirectUrl::from_url(redirect.clone()));
		}

		Self {
			oauth_client,
			http_client,
			client_id: client_id.to_owned(),
			client_secret,
			revocation: endpoints.revocation.clone(),
		}
	}

	/// Runs the client-credentials grant for `scope`.
	pub(crate) async fn exchange_client_credentials(
		&self,
		scope: &ScopeSet,
	) -> Result<OAuth2Credential> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for scope in scope.iter() {
			request = request.add_scope(Scope::new(scope.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::ClientCredentials, meta.take(), err))?;

		credential_from_response(GrantType::ClientCredentials, scope, response)
	}

	/// Exchanges an authorization code; `scope` backs the credential when the provider omits it.
	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		redirect_uri: Option<&Url>,
		scope: &ScopeSet,
	) -> Result<OAuth2Credential> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if let Some(redirect) = redirect_uri {
			request = request.set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect.clone())));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::AuthorizationCode, meta.take(), err))?;

		credential_from_response(GrantType::AuthorizationCode, scope, response)
	}

	/// Redeems a refresh token. The resulting credential keeps the authorization-code grant type
	/// so later refreshes take the same path.
	pub(crate) async fn refresh_token(
		&self,
		refresh_token: &TokenSecret,
		scope: &ScopeSet,
	) -> Result<OAuth2Credential> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::RefreshToken, meta.take(), err))?;

		credential_from_response(GrantType::AuthorizationCode, scope, response)
	}

	/// Posts `token=<access token>` to the revocation endpoint.
	pub(crate) async fn revoke_token(&self, access_token: &TokenSecret) -> Result<()> {
		let response = self
			.http_client
			.post(self.revocation.clone())
			.basic_auth(&self.client_id, Some(self.client_secret.expose()))
			.form(&[("token", access_token.expose())])
			.send()
			.await
			.map_err(map_reqwest_error)?;
		let status = response.status();

		if status.is_success() {
			return Ok(());
		}

		let retry_after = crate::http::parse_retry_after(response.headers());
		let body = response.bytes().await.map_err(ApiError::from)?;

		Err(ApiError::from_response(status.as_u16(), retry_after, &body).into())
	}
}

fn credential_from_response(
	grant: GrantType,
	requested_scope: &ScopeSet,
	response: BasicTokenResponse,
) -> Result<OAuth2Credential> {
	let expires_in = response.expires_in().ok_or(AuthError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| AuthError::ExpiresInOutOfRange)?;
	let scope = match response.scopes() {
		Some(scopes) => ScopeSet::new(scopes.iter().map(|scope| scope.as_str()))
			.map_err(crate::error::ValidationError::from)?,
		None => requested_scope.clone(),
	};
	let mut builder = OAuth2Credential::builder(grant)
		.access_token(response.access_token().secret().to_owned())
		.token_type(response.token_type().as_ref())
		.scope(scope)
		.granted_at(OffsetDateTime::now_utc())
		.expires_in(Duration::seconds(expires_in));

	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}

	builder.build().map_err(|err| match err {
		CredentialBuilderError::ExpiryOutOfRange { .. } => AuthError::ExpiresInOutOfRange.into(),
		err => AuthError::from(err).into(),
	})
}

fn map_request_error(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(grant, response, status),
		RequestTokenError::Request(error) => map_transport_error(error),
		// Non-JSON error bodies (gateway pages and the like) still carry a usable status.
		RequestTokenError::Parse(_, _) if status.is_some_and(|code| code >= 400) => {
			let reason = format!("Token endpoint returned HTTP {}", status.unwrap_or_default());

			auth_error(classify_status(status), reason, status).into()
		},
		RequestTokenError::Parse(source, _body) =>
			AuthError::TokenResponseParse { source, status }.into(),
		RequestTokenError::Other(message) => AuthError::Rejected {
			message: format!("Token endpoint returned an unexpected response: {message}"),
			status,
		}
		.into(),
	}
}

fn map_server_response_error(
	grant: GrantType,
	response: BasicErrorResponse,
	status: Option<u16>,
) -> Error {
	let code = response.error().as_ref();
	let description = response.error_description().map(String::as_str);
	let kind = classify_oauth_error(code, description).unwrap_or_else(|| classify_status(status));
	let reason = match description {
		Some(description) => format!("{code}: {description}"),
		None => code.to_owned(),
	};

	#[cfg(feature = "tracing")]
	tracing::debug!(
		grant = grant.as_str(),
		oauth_error = code,
		?status,
		?kind,
		"Token endpoint rejected the request."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = grant;

	auth_error(kind, reason, status).into()
}

fn auth_error(kind: TokenErrorKind, reason: String, status: Option<u16>) -> AuthError {
	match kind {
		TokenErrorKind::InvalidGrant => AuthError::InvalidGrant { reason, status },
		TokenErrorKind::InvalidClient => AuthError::InvalidClient { reason, status },
		TokenErrorKind::InsufficientScope => AuthError::InsufficientScope { reason, status },
		TokenErrorKind::Rejected => AuthError::Rejected { message: reason, status },
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => ApiError::transport(inner).into(),
		HttpClientError::Other(message) => ApiError::Transport {
			source: format!(
				"HTTP client error occurred while calling the token endpoint: {message}."
			)
			.into(),
		}
		.into(),
		_ => ApiError::Transport {
			source: "HTTP client error occurred while calling the token endpoint.".into(),
		}
		.into(),
	}
}

pub(crate) fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() { ConfigError::from(err).into() } else { ApiError::from(err).into() }
}

fn classify_oauth_error(code: &str, description: Option<&str>) -> Option<TokenErrorKind> {
	match_exact_value(code).or_else(|| description.and_then(match_exact_value))
}

fn match_exact_value(value: &str) -> Option<TokenErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(TokenErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(TokenErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(TokenErrorKind::InsufficientScope)
	} else {
		None
	}
}

fn classify_status(status: Option<u16>) -> TokenErrorKind {
	match status {
		Some(400 | 404 | 410) => TokenErrorKind::InvalidGrant,
		Some(401) => TokenErrorKind::InvalidClient,
		Some(403) => TokenErrorKind::InsufficientScope,
		_ => TokenErrorKind::Rejected,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_codes_take_precedence_over_status() {
		assert_eq!(
			classify_oauth_error("invalid_client", None),
			Some(TokenErrorKind::InvalidClient)
		);
		assert_eq!(classify_oauth_error("ACCESS_DENIED", None), Some(TokenErrorKind::InvalidGrant));
		assert_eq!(
			classify_oauth_error("custom", Some("insufficient_scope")),
			Some(TokenErrorKind::InsufficientScope)
		);
		assert_eq!(classify_oauth_error("custom", Some("something broke")), None);
	}

	#[test]
	fn status_fallback_covers_common_codes() {
		assert_eq!(classify_status(Some(400)), TokenErrorKind::InvalidGrant);
		assert_eq!(classify_status(Some(401)), TokenErrorKind::InvalidClient);
		assert_eq!(classify_status(Some(403)), TokenErrorKind::InsufficientScope);
		assert_eq!(classify_status(Some(503)), TokenErrorKind::Rejected);
		assert_eq!(classify_status(None), TokenErrorKind::Rejected);
	}

	#[test]
	fn auth_errors_carry_reason_and_status() {
		let err = auth_error(TokenErrorKind::InvalidClient, "invalid_client".into(), Some(401));

		assert!(matches!(
			err,
			AuthError::InvalidClient { ref reason, status: Some(401) } if reason == "invalid_client"
		));
	}

	#[test]
	fn facade_builds_from_endpoints() {
		let endpoints =
			ProviderEndpoints::builder().build().expect("Default endpoints should be valid.");
		let redirect =
			Url::parse("https://example.com/callback").expect("Redirect fixture should parse.");
		let facade = BasicFacade::new(
			&endpoints,
			"client-id",
			TokenSecret::new("SANDBOX-secret"),
			Some(&redirect),
			ReqwestHttpClient::default(),
		);

		assert_eq!(facade.revocation, endpoints.revocation);
		assert_eq!(facade.client_secret.expose(), "SANDBOX-secret");
	}
}
