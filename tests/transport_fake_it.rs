// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
// self
use amadeus_client::{
	client::AuthenticatedClient,
	config::ClientConfiguration,
	error::{Error, TokenFetchError, TransportError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TOKEN_PATH, TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode,
		},
	},
	obs::RequestKind,
	url::Url,
};

#[derive(Debug)]
struct Unavailable;
impl Display for Unavailable {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Upstream unavailable.")
	}
}
impl StdError for Unavailable {}

/// Serves tokens from memory and fails every other request after recording a 503.
#[derive(Clone, Default)]
struct FakeTransport {
	fail_token: bool,
	requests: Arc<Mutex<Vec<String>>>,
}
impl HttpTransport for FakeTransport {
	type Handle = FakeHandle;
	type TransportError = Unavailable;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHandle { slot, fail_token: self.fail_token, requests: self.requests.clone() }
	}
}

struct FakeHandle {
	slot: ResponseMetadataSlot,
	fail_token: bool,
	requests: Arc<Mutex<Vec<String>>>,
}
impl<'a> AsyncHttpClient<'a> for FakeHandle {
	type Error = HttpClientError<Unavailable>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let path = request.uri().path().to_owned();
		let is_token = path == TOKEN_PATH;
		let fail = !is_token || self.fail_token;

		self.requests.lock().push(path);

		Box::pin(async move {
			assert!(slot.take().is_none(), "Metadata slot should start empty.");

			if fail {
				slot.store(ResponseMetadata {
					status: Some(503),
					retry_after: Some(Duration::seconds(7)),
				});

				return Err(HttpClientError::Reqwest(Box::new(Unavailable)));
			}

			let mut response =
				HttpResponse::new(b"{\"access_token\":\"fake\",\"expires_in\":1799}".to_vec());

			*response.status_mut() = StatusCode::OK;
			slot.store(ResponseMetadata { status: Some(200), retry_after: None });

			Ok(response)
		})
	}
}

#[derive(Clone, Default)]
struct RecordingMapper {
	calls: Arc<Mutex<Vec<(RequestKind, Option<ResponseMetadata>)>>>,
}
impl TransportErrorMapper<Unavailable> for RecordingMapper {
	fn map_transport_error(
		&self,
		kind: RequestKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<Unavailable>,
	) -> Error {
		self.calls.lock().push((kind, metadata.cloned()));

		TransportError::Other {
			message: error.to_string(),
			status: metadata.and_then(|meta| meta.status),
		}
		.into()
	}
}

fn build_client(
	transport: FakeTransport,
	mapper: RecordingMapper,
) -> AuthenticatedClient<FakeTransport, RecordingMapper> {
	let config = ClientConfiguration::builder("id", "secret")
		.base_url(Url::parse("https://fake.invalid").expect("Fixture URL should parse."))
		.build()
		.expect("Fixture configuration should build.");

	AuthenticatedClient::with_http_client(config, transport, mapper)
}

#[tokio::test]
async fn request_transport_failures_surface_with_metadata() {
	let transport = FakeTransport::default();
	let mapper = RecordingMapper::default();
	let client = build_client(transport.clone(), mapper.clone());
	let err = client
		.get("/v1/reference-data/locations", [("keyword", "LON")])
		.await
		.expect_err("The fake transport fails API requests.");

	match err {
		Error::Transport(TransportError::Other { status, .. }) => assert_eq!(status, Some(503)),
		other => panic!("Unexpected error variant: {other:?}."),
	}
	assert_eq!(
		*transport.requests.lock(),
		vec![TOKEN_PATH.to_owned(), "/v1/reference-data/locations".to_owned()]
	);
	assert_eq!(
		*mapper.calls.lock(),
		vec![(
			RequestKind::Get,
			Some(ResponseMetadata { status: Some(503), retry_after: Some(Duration::seconds(7)) }),
		)]
	);
	assert!(client.cached_token().await.is_some());
}

#[tokio::test]
async fn token_transport_failures_are_token_fetch_errors() {
	let transport = FakeTransport { fail_token: true, ..Default::default() };
	let mapper = RecordingMapper::default();
	let client = build_client(transport.clone(), mapper.clone());
	let err = client.post("/v2/shopping/flight-offers", "{}").await.expect_err("Token fails.");

	match err {
		Error::TokenFetch(err @ TokenFetchError::Transport(_)) =>
			assert_eq!(err.status(), Some(503)),
		other => panic!("Unexpected error variant: {other:?}."),
	}
	assert_eq!(*transport.requests.lock(), vec![TOKEN_PATH.to_owned()]);
	assert_eq!(mapper.calls.lock().first().map(|(kind, _)| *kind), Some(RequestKind::TokenFetch));
}
