//! Optional observability helpers for token fetches and API requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `amadeus_client.request` with the `kind`
//!   and `path` fields, plus a `debug` event whenever a token refresh is required.
//! - Enable `metrics` to increment the `amadeus_client_request_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`, and the
//!   `amadeus_client_token_refresh_total` counter labeled by `reason`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outbound call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
	/// Client-credentials exchange against the token endpoint.
	TokenFetch,
	/// Authenticated GET request.
	Get,
	/// Authenticated POST request.
	Post,
}
impl RequestKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestKind::TokenFetch => "token_fetch",
			RequestKind::Get => "get",
			RequestKind::Post => "post",
		}
	}
}
impl Display for RequestKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller, or a non-2xx API response.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(RequestKind::TokenFetch.to_string(), "token_fetch");
		assert_eq!(RequestKind::Get.as_str(), "get");
		assert_eq!(RequestKind::Post.as_str(), "post");
		assert_eq!(RequestOutcome::Failure.to_string(), "failure");
	}
}
