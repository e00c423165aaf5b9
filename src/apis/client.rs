/// Base HTTP client with a fixed request timeout
use crate::errors::PriceError;
use reqwest::Client;
use std::time::Duration;

/// HTTP client wrapper shared by upstream API clients
///
/// The timeout bounds the whole request (connect + body), so a hung upstream
/// is reported as a normal fetch failure.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, PriceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coinops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PriceError::HttpClient(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
