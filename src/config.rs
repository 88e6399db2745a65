//! Client configuration: credentials, API host, and transport options.

// std
use std::path::PathBuf;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the client identifier.
pub const ENV_CLIENT_ID: &str = "AMADEUS_CLIENT_ID";
/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "AMADEUS_CLIENT_SECRET";
/// Environment variable selecting [`Hostname`] (`test` or `production`).
pub const ENV_HOSTNAME: &str = "AMADEUS_HOSTNAME";
/// Environment variable overriding the base URL; wins over [`ENV_HOSTNAME`].
pub const ENV_BASE_URL: &str = "AMADEUS_BASE_URL";
/// Environment variable pointing at a PEM trust store.
pub const ENV_CA_BUNDLE: &str = "AMADEUS_CA_BUNDLE";

/// Well-known Amadeus API environments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Hostname {
	/// Self-service test environment.
	#[default]
	Test,
	/// Production environment.
	Production,
}
impl Hostname {
	/// Returns the base URL served by this environment.
	pub const fn base_url(self) -> &'static str {
		match self {
			Hostname::Test => "https://test.api.amadeus.com",
			Hostname::Production => "https://api.amadeus.com",
		}
	}

	/// Returns the stable label used in configuration sources.
	pub const fn as_str(self) -> &'static str {
		match self {
			Hostname::Test => "test",
			Hostname::Production => "production",
		}
	}
}
impl Display for Hostname {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Hostname {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"test" => Ok(Hostname::Test),
			"production" => Ok(Hostname::Production),
			_ => Err(ConfigError::InvalidHostname { value: s.to_owned() }),
		}
	}
}

/// Read-only settings owned by a single [`AuthenticatedClient`](crate::client::AuthenticatedClient).
#[derive(Clone, Debug)]
pub struct ClientConfiguration {
	client_id: String,
	client_secret: TokenSecret,
	base_url: Url,
	ca_bundle: Option<PathBuf>,
	timeout: Option<std::time::Duration>,
}
impl ClientConfiguration {
	/// Starts a builder for the provided credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> ClientConfigurationBuilder {
		ClientConfigurationBuilder::new(client_id.into(), TokenSecret::new(client_secret))
	}

	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let client_id = lookup(ENV_CLIENT_ID)
			.ok_or(ConfigError::MissingCredential { name: "client_id" })?;
		let client_secret = lookup(ENV_CLIENT_SECRET)
			.ok_or(ConfigError::MissingCredential { name: "client_secret" })?;
		let mut builder = Self::builder(client_id, client_secret);

		if let Some(hostname) = lookup(ENV_HOSTNAME) {
			builder = builder.hostname(hostname.parse()?);
		}
		if let Some(raw) = lookup(ENV_BASE_URL) {
			let url = Url::parse(&raw)
				.map_err(|source| ConfigError::InvalidUrl { url: raw.clone(), source })?;

			builder = builder.base_url(url);
		}
		if let Some(path) = lookup(ENV_CA_BUNDLE) {
			builder = builder.ca_bundle(path);
		}

		builder.build()
	}

	/// OAuth 2.0 client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// OAuth 2.0 client secret.
	pub fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}

	/// API base URL every request path is appended to.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// PEM trust store replacing the built-in roots, if configured.
	pub fn ca_bundle(&self) -> Option<&PathBuf> {
		self.ca_bundle.as_ref()
	}

	/// Per-request timeout handed to the transport, if configured.
	pub fn timeout(&self) -> Option<std::time::Duration> {
		self.timeout
	}

	/// Joins `path` onto the base URL, inserting a `/` separator when missing.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let raw = if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { url: raw, source })
	}
}

/// Builder for [`ClientConfiguration`].
#[derive(Clone, Debug)]
pub struct ClientConfigurationBuilder {
	client_id: String,
	client_secret: TokenSecret,
	base_url: Option<Url>,
	hostname: Hostname,
	ca_bundle: Option<PathBuf>,
	timeout: Option<std::time::Duration>,
}
impl ClientConfigurationBuilder {
	fn new(client_id: String, client_secret: TokenSecret) -> Self {
		Self {
			client_id,
			client_secret,
			base_url: None,
			hostname: Hostname::default(),
			ca_bundle: None,
			timeout: None,
		}
	}

	/// Targets one of the well-known environments (ignored when a base URL is set).
	pub fn hostname(mut self, hostname: Hostname) -> Self {
		self.hostname = hostname;

		self
	}

	/// Targets an explicit base URL, e.g. a mock server.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Verifies TLS peers against the PEM bundle at `path` instead of the built-in roots.
	pub fn ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
		self.ca_bundle = Some(path.into());

		self
	}

	/// Sets the per-request transport timeout.
	pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Validates the credentials and produces a [`ClientConfiguration`].
	pub fn build(self) -> Result<ClientConfiguration, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingCredential { name: "client_id" });
		}
		if self.client_secret.is_blank() {
			return Err(ConfigError::MissingCredential { name: "client_secret" });
		}

		let base_url = match self.base_url {
			Some(url) => url,
			None => {
				let raw = self.hostname.base_url();

				Url::parse(raw)
					.map_err(|source| ConfigError::InvalidUrl { url: raw.to_owned(), source })?
			},
		};

		Ok(ClientConfiguration {
			client_id: self.client_id,
			client_secret: self.client_secret,
			base_url,
			ca_bundle: self.ca_bundle,
			timeout: self.timeout,
		})
	}
}
