//! Bearer-authenticated GET/POST dispatch and response decoding.

// crates.io
use oauth2::{
	HttpResponse,
	http::{
		HeaderMap, HeaderValue, Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	client::AuthenticatedClient,
	error::{ConfigError, MalformedResponseError},
	http::HttpTransport,
	oauth::{self, TransportErrorMapper},
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
};

/// Content type sent with every API request.
pub const AMADEUS_CONTENT_TYPE: &str = "application/vnd.amadeus+json";
/// Media types accepted from the API.
pub const AMADEUS_ACCEPT: &str = "application/json, application/vnd.amadeus+json";

/// Decoded API response.
///
/// Non-2xx statuses are returned as ordinary responses; inspect [`ApiResponse::status`] or
/// [`ApiResponse::is_success`] to tell them apart.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers as received.
	pub headers: HeaderMap,
	/// Parsed JSON body; [`Value::Null`] when the body was empty.
	pub body: Value,
}
impl ApiResponse {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns a header value when present and valid UTF-8.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Consumes the response, returning the JSON body.
	pub fn into_body(self) -> Value {
		self.body
	}

	fn from_http(response: HttpResponse) -> Result<Self, MalformedResponseError> {
		let status = response.status().as_u16();
		let (parts, body) = response.into_parts();
		let body = if body.iter().all(u8::is_ascii_whitespace) {
			Value::Null
		} else {
			serde_json::from_slice(&body)
				.map_err(|source| MalformedResponseError { status, source })?
		};

		Ok(Self { status, headers: parts.headers, body })
	}
}

impl<C, M> AuthenticatedClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Issues an authenticated GET to `path` with the given query parameters appended in
	/// order.
	///
	/// `path` is relative to the configured base URL, e.g. `/v2/shopping/flight-offers`.
	pub async fn get<I, K, V>(&self, path: &str, query: I) -> Result<ApiResponse>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut url = self.configuration().endpoint(path)?;

		{
			let pairs = query.into_iter().collect::<Vec<_>>();

			if !pairs.is_empty() {
				url.query_pairs_mut()
					.extend_pairs(pairs.iter().map(|(key, value)| (key.as_ref(), value.as_ref())));
			}
		}

		self.dispatch(RequestKind::Get, path, Method::GET, url, Vec::new()).await
	}

	/// Issues an authenticated POST to `path` carrying `body` verbatim.
	pub async fn post(&self, path: &str, body: impl Into<String>) -> Result<ApiResponse> {
		let url = self.configuration().endpoint(path)?;

		self.dispatch(RequestKind::Post, path, Method::POST, url, body.into().into_bytes()).await
	}

	async fn dispatch(
		&self,
		kind: RequestKind,
		path: &str,
		method: Method,
		url: Url,
		body: Vec<u8>,
	) -> Result<ApiResponse> {
		let span = RequestSpan::new(kind, path);

		obs::record_request_outcome(kind, RequestOutcome::Attempt);

		let result = span
			.instrument(async {
				let token = self.get_valid_token().await?;
				let mut authorization = HeaderValue::try_from(token.authorization_header())
					.map_err(|err| ConfigError::from(oauth2::http::Error::from(err)))?;

				authorization.set_sensitive(true);

				let request = oauth2::http::Request::builder()
					.method(method)
					.uri(url.as_str())
					.header(CONTENT_TYPE, AMADEUS_CONTENT_TYPE)
					.header(ACCEPT, AMADEUS_ACCEPT)
					.header(AUTHORIZATION, authorization)
					.body(body)
					.map_err(ConfigError::from)?;
				let (response, _) = oauth::send(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					kind,
					request,
				)
				.await?;

				ApiResponse::from_http(response).map_err(Error::from)
			})
			.await;
		let outcome = match &result {
			Ok(response) if response.is_success() => RequestOutcome::Success,
			_ => RequestOutcome::Failure,
		};

		obs::record_request_outcome(kind, outcome);

		result
	}
}
