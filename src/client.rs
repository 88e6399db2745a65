//! Authenticated API client that owns the token lifecycle.
//!
//! [`AuthenticatedClient`] keeps exactly one current [`AccessToken`] per instance. Every
//! request asks [`AuthenticatedClient::get_valid_token`] for a token; the lookup, the
//! optional client-credentials exchange, and the store update run while the token mutex is
//! held, so concurrent callers of one client never start overlapping refreshes or observe a
//! half-replaced token.

mod metrics;
mod request;

pub use metrics::TokenMetrics;
pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::ClientConfiguration,
	http::HttpTransport,
	oauth::{self, TransportErrorMapper},
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
	store::{RefreshReason, TokenStore},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthenticatedClient =
	AuthenticatedClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// HTTP client facade that attaches a cached, automatically refreshed bearer token to every
/// Amadeus API request.
///
/// The client exclusively owns its [`ClientConfiguration`] and token slot; it is deliberately
/// not `Clone`, so two instances never share a token.
pub struct AuthenticatedClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for the token endpoint and every API request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Counters for token endpoint exchanges.
	pub token_metrics: TokenMetrics,
	config: ClientConfiguration,
	token_store: AsyncMutex<TokenStore>,
}
impl<C, M> AuthenticatedClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	///
	/// No token is fetched until the first request needs one.
	pub fn with_http_client(
		config: ClientConfiguration,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			token_metrics: TokenMetrics::default(),
			config,
			token_store: AsyncMutex::new(TokenStore::default()),
		}
	}

	/// Configuration the client was built with.
	pub fn configuration(&self) -> &ClientConfiguration {
		&self.config
	}

	/// Returns a token that is not expired at the moment of return, fetching a new one when
	/// none is cached or the cached one reached its expiry instant.
	///
	/// A failed fetch leaves the cached token in place; the next call fetches again.
	pub async fn get_valid_token(&self) -> Result<AccessToken> {
		let mut store = self.token_store.lock().await;

		store.get_or_refresh(OffsetDateTime::now_utc(), |reason| self.refresh_token(reason)).await
	}

	/// Returns the cached token without validating or refreshing it.
	pub async fn cached_token(&self) -> Option<AccessToken> {
		self.token_store.lock().await.current().cloned()
	}

	/// Drops the cached token so the next request performs a fresh exchange.
	///
	/// Useful when the API rejects a token before its advertised expiry.
	pub async fn invalidate_token(&self) -> Option<AccessToken> {
		self.token_store.lock().await.clear()
	}

	async fn refresh_token(&self, reason: RefreshReason) -> Result<AccessToken> {
		const KIND: RequestKind = RequestKind::TokenFetch;

		let span = RequestSpan::new(KIND, oauth::TOKEN_PATH);

		obs::record_token_refresh(reason);
		obs::record_request_outcome(KIND, RequestOutcome::Attempt);
		self.token_metrics.record_attempt();

		let result = span
			.instrument(async {
				obs::trace_token_refresh(reason);

				oauth::fetch_access_token(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					&self.config,
				)
				.await
			})
			.await;

		match &result {
			Ok(_) => {
				self.token_metrics.record_success();
				obs::record_request_outcome(KIND, RequestOutcome::Success);
			},
			Err(_) => {
				self.token_metrics.record_failure();
				obs::record_request_outcome(KIND, RequestOutcome::Failure);
			},
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl AuthenticatedClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client backed by a reqwest transport built from `config` (timeout and trust
	/// store included).
	pub fn new(config: ClientConfiguration) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_http_client(config, http_client, ReqwestTransportErrorMapper))
	}

	/// Creates a client from the `AMADEUS_*` environment variables.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfiguration::from_env()?)
	}
}
impl<C, M> Debug for AuthenticatedClient<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedClient")
			.field("config", &self.config)
			.field("token_metrics", &self.token_metrics)
			.finish()
	}
}
