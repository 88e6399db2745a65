//! Immutable access-token value object, lifecycle helpers, and builder.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token type assumed when the endpoint does not advertise one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Current lifecycle status for an access token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Token may still be attached to requests.
	Active,
	/// Token reached or passed its expiry instant.
	Expired,
}

/// Errors produced by [`AccessTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AccessTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the access token value is empty.
	#[error("Access token cannot be empty.")]
	EmptyAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when `issued_at + expires_in` leaves the representable range.
	#[error("Expiry overflows the supported timestamp range.")]
	ExpiryOutOfRange,
}

/// Bearer credential minted by the token endpoint.
///
/// The expiry instant is fixed when the token is built; a later fetch supersedes the whole
/// value instead of mutating it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Advertised token type used as the `Authorization` scheme.
	pub token_type: String,
	/// Instant the token response was received.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `issued_at + expires_in`.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Returns a builder for constructing tokens.
	pub fn builder() -> AccessTokenBuilder {
		AccessTokenBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	///
	/// A token is expired at its nominal expiry instant, not one tick after it.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant >= self.expires_at { TokenStatus::Expired } else { TokenStatus::Active }
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Expired)
	}

	/// Value of the `Authorization` header, e.g. `Bearer my_token`.
	pub fn authorization_header(&self) -> String {
		format!("{} {}", self.token_type, self.access_token.expose())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`AccessToken`].
#[derive(Clone, Debug, Default)]
pub struct AccessTokenBuilder {
	access_token: Option<TokenSecret>,
	token_type: Option<String>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl AccessTokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type (defaults to [`DEFAULT_TOKEN_TYPE`]).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant; negative values yield a token
	/// that is already expired.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces an [`AccessToken`].
	pub fn build(self) -> Result<AccessToken, AccessTokenBuilderError> {
		let access_token =
			self.access_token.ok_or(AccessTokenBuilderError::MissingAccessToken)?;

		if access_token.expose().is_empty() {
			return Err(AccessTokenBuilderError::EmptyAccessToken);
		}

		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) =>
				issued_at.checked_add(delta).ok_or(AccessTokenBuilderError::ExpiryOutOfRange)?,
			(None, None) => return Err(AccessTokenBuilderError::MissingExpiry),
		};
		let token_type = self.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_owned());

		Ok(AccessToken { access_token, token_type, issued_at, expires_at })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn status_flips_at_the_expiry_instant() {
		let token = AccessToken::builder()
			.access_token("my_token")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_at(macros::datetime!(2025-01-01 01:00 UTC))
			.build()
			.expect("Token builder should succeed for status transitions.");

		assert_eq!(token.status_at(macros::datetime!(2025-01-01 00:59:59 UTC)), TokenStatus::Active);
		assert_eq!(token.status_at(macros::datetime!(2025-01-01 01:00 UTC)), TokenStatus::Expired);
		assert_eq!(token.status_at(macros::datetime!(2025-01-01 01:00:01 UTC)), TokenStatus::Expired);
	}

	#[test]
	fn builder_handles_relative_expiry() {
		let token = AccessToken::builder()
			.access_token("my_token")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(1799))
			.build()
			.expect("Token builder should support relative expiry calculations.");

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 00:29:59 UTC));
		assert_eq!(token.token_type, DEFAULT_TOKEN_TYPE);
	}

	#[test]
	fn negative_lifetime_is_already_expired() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = AccessToken::builder()
			.access_token("my_token")
			.issued_at(issued)
			.expires_in(Duration::seconds(-1))
			.build()
			.expect("Token builder should accept negative lifetimes.");

		assert!(token.is_expired_at(issued));
	}

	#[test]
	fn builder_rejects_incomplete_input() {
		assert_eq!(
			AccessToken::builder().expires_in(Duration::minutes(1)).build(),
			Err(AccessTokenBuilderError::MissingAccessToken)
		);
		assert_eq!(
			AccessToken::builder().access_token("").expires_in(Duration::minutes(1)).build(),
			Err(AccessTokenBuilderError::EmptyAccessToken)
		);
		assert_eq!(
			AccessToken::builder().access_token("my_token").build(),
			Err(AccessTokenBuilderError::MissingExpiry)
		);
		assert_eq!(
			AccessToken::builder()
				.access_token("my_token")
				.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
				.expires_in(Duration::MAX)
				.build(),
			Err(AccessTokenBuilderError::ExpiryOutOfRange)
		);
	}

	#[test]
	fn authorization_header_joins_type_and_token() {
		let token = AccessToken::builder()
			.access_token("my_token")
			.expires_in(Duration::minutes(30))
			.build()
			.expect("Token builder should succeed for header formatting.");

		assert_eq!(token.authorization_header(), "Bearer my_token");

		let custom = AccessToken::builder()
			.access_token("abc")
			.token_type("MAC")
			.expires_in(Duration::minutes(30))
			.build()
			.expect("Token builder should accept custom token types.");

		assert_eq!(custom.authorization_header(), "MAC abc");
		assert!(!format!("{custom:?}").contains("abc"));
	}
}
