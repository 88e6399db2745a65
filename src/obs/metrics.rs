// self
use crate::{
	obs::{RequestKind, RequestOutcome},
	store::RefreshReason,
};

/// Records a request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(kind: RequestKind, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"amadeus_client_request_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records that the cached token had to be refreshed (when enabled).
pub fn record_token_refresh(reason: RefreshReason) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("amadeus_client_token_refresh_total", "reason" => reason.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}
