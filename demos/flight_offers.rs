//! Searches flight offers through an authenticated client pointed at a local mock of the
//! Amadeus API, showing that the token is fetched once and reused across calls.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use amadeus_client::{
	client::ReqwestAuthenticatedClient,
	config::ClientConfiguration,
	http::ReqwestHttpClient,
	oauth::{ReqwestTransportErrorMapper, TOKEN_PATH},
	reqwest::Client,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":1799}");
		})
		.await;
	let offers_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/shopping/flight-offers")
				.header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/vnd.amadeus+json").body(
				"{\"meta\":{\"count\":1},\"data\":[{\"id\":\"1\",\"price\":{\"total\":\"242.31\",\"currency\":\"EUR\"}}]}",
			);
		})
		.await;
	let config = ClientConfiguration::builder("demo-client", "demo-secret")
		.base_url(Url::parse(&server.base_url())?)
		.build()?;
	// The mock server presents a self-signed certificate.
	let http_client = ReqwestHttpClient::from_builder(
		Client::builder().danger_accept_invalid_certs(true).danger_accept_invalid_hostnames(true),
		&config,
	)?;
	let client = ReqwestAuthenticatedClient::with_http_client(
		config,
		http_client,
		ReqwestTransportErrorMapper,
	);

	for (origin, destination) in [("MAD", "NYC"), ("SYD", "BKK")] {
		let response = client
			.get(
				"/v2/shopping/flight-offers",
				[
					("originLocationCode", origin),
					("destinationLocationCode", destination),
					("departureDate", "2026-11-01"),
					("adults", "1"),
				],
			)
			.await?;

		println!(
			"{origin} -> {destination}: status {}, first offer {}.",
			response.status, response.body["data"][0]["price"]["total"]
		);
	}

	token_mock.assert_calls_async(1).await;
	offers_mock.assert_calls_async(2).await;

	Ok(())
}
