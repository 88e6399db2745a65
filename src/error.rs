//! Client-level error types shared across the token lifecycle and request dispatch.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The token endpoint could not be reached or returned an unusable response.
	#[error(transparent)]
	TokenFetch(#[from] TokenFetchError),
	/// Transport failure (DNS, TCP, TLS, timeout) on an API request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// API response body is not valid JSON.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
}

/// Configuration and validation failures raised by the client.
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
	/// Base URL or request URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required credential is empty or absent.
	#[error("Credential `{name}` is missing or empty.")]
	MissingCredential {
		/// Credential label (`client_id`, `client_secret`).
		name: &'static str,
	},
	/// Hostname label is neither `test` nor `production`.
	#[error("Hostname `{value}` is not one of `test` or `production`.")]
	InvalidHostname {
		/// Offending hostname label.
		value: String,
	},
	/// Trust store bundle could not be read.
	#[error("CA bundle `{}` could not be read.", path.display())]
	CaBundle {
		/// Path of the PEM bundle.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Trust store bundle holds no PEM certificate.
	#[error("CA bundle `{}` contains no certificate.", path.display())]
	EmptyCaBundle {
		/// Path of the PEM bundle.
		path: PathBuf,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint failures; the cached token is left untouched when one is raised.
#[derive(Debug, ThisError)]
pub enum TokenFetchError {
	/// Underlying transport failed while calling the token endpoint.
	#[error("Token endpoint could not be reached.")]
	Transport(#[from] TransportError),
	/// Token endpoint responded without a usable `access_token`.
	#[error(
		"Token endpoint did not return an access token: {}.",
		.error_description.as_deref().or(.error.as_deref()).unwrap_or("no error detail")
	)]
	MissingAccessToken {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// OAuth `error` code carried by the body, if any.
		error: Option<String>,
		/// OAuth `error_description` carried by the body, if any.
		error_description: Option<String>,
	},
	/// Token endpoint responded with a body that is not JSON.
	#[error("Token endpoint returned malformed JSON.")]
	Malformed {
		/// JSON parsing failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint JSON is missing a required field or carries the wrong type.
	#[error("Token endpoint returned an invalid token payload.")]
	InvalidField {
		/// Structured decoding failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an `expires_in` that overflows the timestamp range.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl TokenFetchError {
	/// HTTP status reported by the token endpoint, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::MissingAccessToken { status, .. }
			| Self::Malformed { status, .. }
			| Self::InvalidField { status, .. } => *status,
			Self::Transport(TransportError::Other { status, .. }) => *status,
			_ => None,
		}
	}
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting for the API.
	#[error("Request timed out while calling the API.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// Transport failure that fits no other variant.
	#[error("HTTP client error occurred while calling the API: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
		/// HTTP status code, when the transport saw one before failing.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// API response body could not be parsed as JSON.
#[derive(Debug, ThisError)]
#[error("API responded with status {status} and a body that is not valid JSON.")]
pub struct MalformedResponseError {
	/// HTTP status code of the response.
	pub status: u16,
	/// JSON parsing failure.
	#[source]
	pub source: serde_json::Error,
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as _;
	// self
	use super::*;

	#[test]
	fn missing_access_token_prefers_error_description() {
		let err = TokenFetchError::MissingAccessToken {
			status: Some(401),
			retry_after: None,
			error: Some("invalid_client".into()),
			error_description: Some("Client credentials are invalid".into()),
		};

		assert_eq!(
			err.to_string(),
			"Token endpoint did not return an access token: Client credentials are invalid."
		);
		assert_eq!(err.status(), Some(401));

		let bare = TokenFetchError::MissingAccessToken {
			status: None,
			retry_after: None,
			error: None,
			error_description: None,
		};

		assert_eq!(bare.to_string(), "Token endpoint did not return an access token: no error detail.");
	}

	#[test]
	fn token_fetch_error_keeps_transport_source() {
		let transport = TransportError::Io(std::io::Error::other("connection reset"));
		let err: Error = TokenFetchError::from(transport).into();

		assert!(matches!(err, Error::TokenFetch(TokenFetchError::Transport(TransportError::Io(_)))));

		let source = err.source().expect("Token fetch errors should expose the transport source.");

		assert_eq!(source.to_string(), "I/O error occurred while calling the API.");
	}

	#[test]
	fn malformed_response_reports_status() {
		let source = serde_json::from_str::<Value>("<html>")
			.expect_err("HTML fixture should not parse as JSON.");
		let err = MalformedResponseError { status: 502, source };

		assert!(err.to_string().contains("502"));
	}
}
