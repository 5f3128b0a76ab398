//! Client-level error types shared across flows, sessions, and resource calls.
//!
//! Failures fall into three caller-facing buckets plus local misconfiguration:
//!
//! - [`ValidationError`]: bad or missing local input; no network call was made.
//! - [`AuthError`]: a grant exchange or refresh was rejected, or the authorization redirect or
//!   token response was malformed.
//! - [`ApiError`]: transport failure or a non-2xx resource response.
//! - [`ConfigError`]: endpoints or HTTP plumbing could not be constructed.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local input validation failed before any request was sent.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Authorization or token exchange failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Transport failure or non-2xx response from a resource endpoint.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// HTTP status attached to the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(err) => err.status(),
			Self::Auth(err) => err.status(),
			Self::Validation(_) | Self::Config(_) => None,
		}
	}
}

/// Local input failures raised before contacting the provider.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum ValidationError {
	/// A required parameter was not supplied.
	#[error("Missing required parameter `{name}`.")]
	MissingParameter {
		/// Parameter name as sent on the wire.
		name: &'static str,
	},
	/// A string parameter was supplied but empty.
	#[error("Parameter `{name}` cannot be empty.")]
	EmptyParameter {
		/// Parameter name as sent on the wire.
		name: &'static str,
	},
	/// A numeric parameter fell outside its accepted range.
	#[error("Parameter `{name}` must be within [{min}, {max}], got {value}.")]
	OutOfRange {
		/// Parameter name as sent on the wire.
		name: &'static str,
		/// Supplied value.
		value: f64,
		/// Inclusive lower bound.
		min: f64,
		/// Inclusive upper bound.
		max: f64,
	},
	/// Parameters that only make sense together were only partially supplied.
	#[error("Parameters `{first}` and `{second}` must be supplied together.")]
	IncompletePair {
		/// First parameter of the pair.
		first: &'static str,
		/// Second parameter of the pair.
		second: &'static str,
	},
	/// A parameter was supplied in an unsupported format.
	#[error("Parameter `{name}` is invalid: {reason}.")]
	InvalidParameter {
		/// Parameter name as sent on the wire.
		name: &'static str,
		/// Human-readable reason.
		reason: String,
	},
	/// Endpoint is only available against the sandbox environment.
	#[error("Endpoint `{endpoint}` is only available in sandbox mode.")]
	SandboxOnly {
		/// Endpoint path.
		endpoint: &'static str,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}

/// Grant, refresh, and authorization redirect failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Provider rejected the grant (e.g., bad or expired code or refresh token).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Requested scopes were refused.
	#[error("Provider refused the requested scopes: {reason}.")]
	InsufficientScope {
		/// Provider-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an error that does not map onto a more specific variant.
	#[error("Token endpoint rejected the request: {message}.")]
	Rejected {
		/// Provider- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint response could not be turned into a credential.
	#[error("Unable to build credential from the token response.")]
	Credential(#[from] crate::auth::CredentialBuilderError),
	/// Redirect URL could not be parsed.
	#[error("Redirect URL is malformed.")]
	MalformedRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect carried neither `code` nor `error`.
	#[error("Redirect URL carries neither a `code` nor an `error` query parameter.")]
	MissingCode,
	/// Redirect carried both `code` and `error`.
	#[error("Redirect URL carries both `code` and `error` query parameters.")]
	CodeAndError,
	/// User or provider denied the authorization request.
	#[error("Authorization was denied: {error}.")]
	AuthorizationDenied {
		/// Provider-supplied `error` value.
		error: String,
	},
	/// Redirect omitted `state` while the grant requires it.
	#[error("Redirect URL is missing the state parameter.")]
	MissingState,
	/// Redirect `state` does not match the token the grant issued.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// Credential has no refresh token, so the authorization-code refresh path is unavailable.
	#[error("Credential is missing a refresh token.")]
	MissingRefreshToken,
}
impl AuthError {
	/// HTTP status attached to the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::InvalidGrant { status, .. }
			| Self::InvalidClient { status, .. }
			| Self::InsufficientScope { status, .. }
			| Self::Rejected { status, .. }
			| Self::TokenResponseParse { status, .. } => *status,
			_ => None,
		}
	}
}

/// A single parameter-level problem reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
	/// Offending parameter name.
	pub parameter: String,
	/// Provider's description of the problem.
	pub title: String,
}
impl Display for ErrorDetail {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "\"{}\" - {}", self.parameter, self.title)
	}
}

/// Resource call failures (transport and non-2xx responses).
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Provider answered with a 4xx status.
	#[error("Provider rejected the request with HTTP {status}: {message}.")]
	Client {
		/// HTTP status code.
		status: u16,
		/// Provider error code (`error` field), when present.
		code: Option<String>,
		/// Summary taken from `error_description`, `error_detail`, or `error`.
		message: String,
		/// Parameter-level details reported by the provider.
		details: Vec<ErrorDetail>,
		/// Raw decoded body (`null` when empty, a JSON string when not JSON).
		body: serde_json::Value,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Provider answered with a 5xx status.
	#[error("Provider failed to process the request with HTTP {status}.")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Raw decoded body (`null` when empty, a JSON string when not JSON).
		body: serde_json::Value,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Successful response body was not valid JSON.
	#[error("Provider returned a body that is not valid JSON.")]
	Decode {
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
}
impl ApiError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// HTTP status attached to the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport { .. } => None,
			Self::Client { status, .. }
			| Self::Server { status, .. }
			| Self::Decode { status, .. } => Some(*status),
		}
	}
}
impl ApiError {
	/// Classifies a non-2xx response: 5xx becomes [`ApiError::Server`], everything else
	/// [`ApiError::Client`] with the provider's message and parameter details extracted.
	pub fn from_response(status: u16, retry_after: Option<Duration>, body: &[u8]) -> Self {
		let body = lenient_body(body);

		if status >= 500 {
			return Self::Server { status, body, retry_after };
		}

		let code = body.get("error").and_then(serde_json::Value::as_str).map(str::to_owned);
		let details = body.get("error_detail").map(error_details).unwrap_or_default();
		let message = body
			.get("error_description")
			.and_then(serde_json::Value::as_str)
			.map(str::to_owned)
			.or_else(|| {
				(!details.is_empty()).then(|| {
					details.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
				})
			})
			.or_else(|| code.clone())
			.unwrap_or_else(|| format!("HTTP {status}"));

		Self::Client { status, code, message, details, body, retry_after }
	}
}
impl From<ReqwestError> for ApiError {
	fn from(e: ReqwestError) -> Self {
		Self::transport(e)
	}
}

fn lenient_body(body: &[u8]) -> serde_json::Value {
	if body.iter().all(u8::is_ascii_whitespace) {
		return serde_json::Value::Null;
	}

	serde_json::from_slice(body)
		.unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}

// `error_detail` is a list of single-entry `{parameter: title}` maps.
fn error_details(value: &serde_json::Value) -> Vec<ErrorDetail> {
	value
		.as_array()
		.into_iter()
		.flatten()
		.filter_map(serde_json::Value::as_object)
		.flat_map(|entry| {
			entry.iter().map(|(parameter, title)| ErrorDetail {
				parameter: parameter.clone(),
				title: title.as_str().map(str::to_owned).unwrap_or_else(|| title.to_string()),
			})
		})
		.collect()
}

/// Configuration failures raised while wiring endpoints and transports.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Endpoint set failed validation.
	#[error(transparent)]
	Endpoints(#[from] crate::provider::EndpointsError),
	/// A resource path could not be joined onto the API base URL.
	#[error("Resource path `{path}` cannot be joined onto the API base URL.")]
	ResourcePath {
		/// Relative resource path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
