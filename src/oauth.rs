//! Client-credentials token exchange and transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		Method,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccessTokenBuilderError},
	config::ClientConfiguration,
	error::{ConfigError, TokenFetchError, TransportError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	obs::RequestKind,
};

/// Path of the token endpoint, relative to the configured base URL.
pub const TOKEN_PATH: &str = "/v1/security/oauth2/token";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	///
	/// Transport failures returned as [`Error::Transport`] during a
	/// [`RequestKind::TokenFetch`] are surfaced to callers as
	/// [`TokenFetchError::Transport`].
	fn map_transport_error(
		&self,
		kind: RequestKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_kind: RequestKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::Other { message, status: meta_status(meta) }.into(),
			_ => TransportError::Other {
				message: "unrecognized HTTP client failure".into(),
				status: meta_status(meta),
			}
			.into(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	expires_in: i64,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorBody {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

/// Performs the client-credentials exchange and returns a freshly minted token.
pub(crate) async fn fetch_access_token<C, M>(
	http_client: &C,
	mapper: &M,
	config: &ClientConfiguration,
) -> Result<AccessToken>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let request = build_token_request(config)?;
	let (response, meta) = send(http_client, mapper, RequestKind::TokenFetch, request).await?;
	let received_at = OffsetDateTime::now_utc();
	let meta = meta.unwrap_or_else(|| ResponseMetadata {
		status: Some(response.status().as_u16()),
		retry_after: None,
	});

	decode_token_response(response.body(), &meta, received_at).map_err(Error::from)
}

/// Dispatches `request` through a fresh metadata-instrumented handle.
pub(crate) async fn send<C, M>(
	http_client: &C,
	mapper: &M,
	kind: RequestKind,
	request: HttpRequest,
) -> Result<(HttpResponse, Option<ResponseMetadata>)>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(slot.clone());

	match handle.call(request).await {
		Ok(response) => Ok((response, slot.take())),
		Err(err) => Err(match mapper.map_transport_error(kind, slot.take().as_ref(), err) {
			Error::Transport(inner) if kind == RequestKind::TokenFetch =>
				TokenFetchError::Transport(inner).into(),
			other => other,
		}),
	}
}

pub(crate) fn build_token_request(config: &ClientConfiguration) -> Result<HttpRequest> {
	let url = config.endpoint(TOKEN_PATH)?;
	let form = FormSerializer::new(String::new())
		.append_pair("grant_type", "client_credentials")
		.append_pair("client_id", config.client_id())
		.append_pair("client_secret", config.client_secret().expose())
		.finish();

	oauth2::http::Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
		.header(ACCEPT, "application/json")
		.body(form.into_bytes())
		.map_err(|err| ConfigError::from(err).into())
}

fn decode_token_response(
	body: &[u8],
	meta: &ResponseMetadata,
	received_at: OffsetDateTime,
) -> Result<AccessToken, TokenFetchError> {
	let status = meta.status;
	let value = serde_json::from_slice::<Value>(body)
		.map_err(|source| TokenFetchError::Malformed { source, status })?;
	let has_token = value
		.get("access_token")
		.and_then(Value::as_str)
		.is_some_and(|token| !token.is_empty());

	if !has_token {
		let detail = serde_json::from_value::<TokenErrorBody>(value).unwrap_or_default();

		return Err(TokenFetchError::MissingAccessToken {
			status,
			retry_after: meta.retry_after,
			error: detail.error,
			error_description: detail.error_description,
		});
	}

	let response: TokenResponse = serde_path_to_error::deserialize(value)
		.map_err(|source| TokenFetchError::InvalidField { source, status })?;
	let mut builder = AccessToken::builder()
		.access_token(response.access_token)
		.issued_at(received_at)
		.expires_in(Duration::seconds(response.expires_in));

	if let Some(token_type) = response.token_type.filter(|value| !value.trim().is_empty()) {
		builder = builder.token_type(token_type);
	}

	builder.build().map_err(|err| match err {
		AccessTokenBuilderError::ExpiryOutOfRange => TokenFetchError::ExpiresInOutOfRange,
		_ => TokenFetchError::MissingAccessToken {
			status,
			retry_after: meta.retry_after,
			error: None,
			error_description: Some(err.to_string()),
		},
	})
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const RECEIVED_AT: OffsetDateTime = macros::datetime!(2025-01-01 12:00 UTC);

	fn ok_meta() -> ResponseMetadata {
		ResponseMetadata { status: Some(200), retry_after: None }
	}

	fn decode(body: &str) -> Result<AccessToken, TokenFetchError> {
		decode_token_response(body.as_bytes(), &ok_meta(), RECEIVED_AT)
	}

	#[test]
	fn token_request_posts_client_credentials_form() {
		let config = ClientConfiguration::builder("id", "s3cr&t")
			.base_url(Url::parse("http://127.0.0.1:9000").expect("Fixture URL should parse."))
			.build()
			.expect("Configuration fixture should build.");
		let request = build_token_request(&config).expect("Token request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri().to_string(), "http://127.0.0.1:9000/v1/security/oauth2/token");
		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some(FORM_CONTENT_TYPE)
		);
		assert_eq!(
			request.body().as_slice(),
			b"grant_type=client_credentials&client_id=id&client_secret=s3cr%26t"
		);
	}

	#[test]
	fn decodes_token_with_default_type() {
		let token = decode("{\"access_token\":\"my_token\",\"expires_in\":1799}")
			.expect("Minimal token payloads should decode.");

		assert_eq!(token.access_token.expose(), "my_token");
		assert_eq!(token.token_type, "Bearer");
		assert_eq!(token.issued_at, RECEIVED_AT);
		assert_eq!(token.expires_at, RECEIVED_AT + Duration::seconds(1799));
	}

	#[test]
	fn decodes_full_amadeus_payload() {
		let token = decode(
			"{\"type\":\"amadeusOAuth2Token\",\"username\":\"dev@example.com\",\
			 \"application_name\":\"demo\",\"client_id\":\"id\",\"token_type\":\"Bearer\",\
			 \"access_token\":\"AnLhEPMw\",\"expires_in\":1799,\"state\":\"approved\",\"scope\":\"\"}",
		)
		.expect("Full Amadeus payloads should decode.");

		assert_eq!(token.authorization_header(), "Bearer AnLhEPMw");
	}

	#[test]
	fn negative_lifetime_yields_expired_token() {
		let token = decode("{\"access_token\":\"my_token\",\"expires_in\":-1}")
			.expect("Negative lifetimes should decode.");

		assert!(token.is_expired_at(RECEIVED_AT));
	}

	#[test]
	fn error_payload_is_reported_as_missing_token() {
		let meta = ResponseMetadata { status: Some(401), retry_after: Some(Duration::seconds(2)) };
		let err = decode_token_response(
			b"{\"error\":\"invalid_client\",\"error_description\":\"Client credentials are invalid\",\"code\":38187}",
			&meta,
			RECEIVED_AT,
		)
		.expect_err("OAuth error payloads should not decode into tokens.");

		match err {
			TokenFetchError::MissingAccessToken { status, retry_after, error, error_description } => {
				assert_eq!(status, Some(401));
				assert_eq!(retry_after, Some(Duration::seconds(2)));
				assert_eq!(error.as_deref(), Some("invalid_client"));
				assert_eq!(error_description.as_deref(), Some("Client credentials are invalid"));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn empty_or_non_string_tokens_are_missing() {
		for body in [
			"{\"access_token\":\"\",\"expires_in\":1799}",
			"{\"access_token\":42,\"expires_in\":1799}",
			"[]",
		] {
			assert!(matches!(decode(body), Err(TokenFetchError::MissingAccessToken { .. })));
		}
	}

	#[test]
	fn malformed_json_is_rejected() {
		assert!(matches!(
			decode("<html>Service Unavailable</html>"),
			Err(TokenFetchError::Malformed { status: Some(200), .. })
		));
	}

	#[test]
	fn invalid_fields_are_rejected() {
		match decode("{\"access_token\":\"my_token\"}") {
			Err(TokenFetchError::InvalidField { source, .. }) =>
				assert!(source.inner().to_string().contains("expires_in")),
			other => panic!("Unexpected decode result: {other:?}."),
		}
		match decode("{\"access_token\":\"my_token\",\"expires_in\":\"1799\"}") {
			Err(TokenFetchError::InvalidField { source, .. }) =>
				assert_eq!(source.path().to_string(), "expires_in"),
			other => panic!("Unexpected decode result: {other:?}."),
		}
	}

	#[test]
	fn oversized_lifetime_is_out_of_range() {
		assert!(matches!(
			decode("{\"access_token\":\"my_token\",\"expires_in\":9223372036854775807}"),
			Err(TokenFetchError::ExpiresInOutOfRange)
		));
	}
}
