//! Single-slot token store that owns the check-then-refresh sequence.

// self
use crate::{_prelude::*, auth::AccessToken};

/// Why a refresh was required.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshReason {
	/// No token has been fetched yet (or the slot was cleared).
	Missing,
	/// The stored token reached its expiry instant.
	Expired,
}
impl RefreshReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshReason::Missing => "missing",
			RefreshReason::Expired => "expired",
		}
	}
}
impl Display for RefreshReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Holds the current [`AccessToken`], replaced wholesale on every successful refresh.
///
/// The store itself is not synchronized; [`AuthenticatedClient`](crate::client::AuthenticatedClient)
/// keeps it behind an async mutex so the whole check, fetch, and store sequence runs as one
/// critical section.
#[derive(Clone, Debug, Default)]
pub struct TokenStore {
	current: Option<AccessToken>,
}
impl TokenStore {
	/// Returns the stored token, valid or not.
	pub fn current(&self) -> Option<&AccessToken> {
		self.current.as_ref()
	}

	/// Returns the stored token if it is still valid at `now`.
	pub fn valid_at(&self, now: OffsetDateTime) -> Option<&AccessToken> {
		self.current.as_ref().filter(|token| !token.is_expired_at(now))
	}

	/// Supersedes the stored token.
	pub fn replace(&mut self, token: AccessToken) -> Option<AccessToken> {
		self.current.replace(token)
	}

	/// Drops the stored token so the next lookup refreshes.
	pub fn clear(&mut self) -> Option<AccessToken> {
		self.current.take()
	}

	/// Returns the token valid at `now`, invoking `fetch` when it is missing or expired.
	///
	/// The fetched token is stored only when `fetch` succeeds; on failure the previous token
	/// stays in place so the next call tries again.
	pub async fn get_or_refresh<F, Fut>(
		&mut self,
		now: OffsetDateTime,
		fetch: F,
	) -> Result<AccessToken>
	where
		F: FnOnce(RefreshReason) -> Fut,
		Fut: Future<Output = Result<AccessToken>>,
	{
		if let Some(token) = self.valid_at(now) {
			return Ok(token.clone());
		}

		let reason =
			if self.current.is_some() { RefreshReason::Expired } else { RefreshReason::Missing };
		let token = fetch(reason).await?;

		self.replace(token.clone());

		Ok(token)
	}
}
