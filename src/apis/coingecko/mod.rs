/// CoinGecko API client
///
/// API Documentation: https://docs.coingecko.com/reference/introduction
///
/// Endpoints implemented:
/// 1. /simple/price?ids=...&vs_currencies=...&include_24hr_change=true - Current quotes

pub mod types;

use self::types::parse_simple_price;
use crate::apis::client::HttpClient;
use crate::apis::PriceSource;
use crate::config::PricingConfig;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use crate::pricing::types::Quote;
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::time::{Duration, Instant};

// ============================================================================
// API CONFIGURATION
// ============================================================================

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the demo-tier API key, when one is configured
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Request timeout for the quote endpoint
pub const TIMEOUT_SECS: u64 = 10;

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct CoinGeckoClient {
    http_client: HttpClient,
    base_url: String,
    vs_currency: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, vs_currency: &str, timeout: Duration) -> Result<Self, PriceError> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            vs_currency: vs_currency.to_lowercase(),
            api_key: None,
        })
    }

    pub fn from_config(config: &PricingConfig) -> Result<Self, PriceError> {
        let mut client = Self::new(
            &config.api_base_url,
            &config.vs_currency,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        client.api_key = config.api_key.clone().filter(|k| !k.is_empty());
        Ok(client)
    }

    pub fn vs_currency(&self) -> &str {
        &self.vs_currency
    }

    pub fn timeout(&self) -> Duration {
        self.http_client.timeout()
    }

    /// Build the `/simple/price` URL for a set of coin ids
    pub fn simple_price_url(&self, ids: &[String]) -> Result<Url, PriceError> {
        Url::parse_with_params(
            &format!("{}/simple/price", self.base_url),
            &[
                ("ids", ids.join(",")),
                ("vs_currencies", self.vs_currency.clone()),
                ("include_24hr_change", "true".to_string()),
            ],
        )
        .map_err(|e| PriceError::UpstreamUnavailable(format!("invalid quote URL: {}", e)))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch_prices(&self, ids: &[String]) -> Result<HashMap<String, Quote>, PriceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let start = Instant::now();
        let url = self.simple_price_url(ids)?;

        let mut request = self
            .http_client
            .client()
            .get(url)
            .header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PriceError::UpstreamUnavailable(format!(
                    "request timed out after {}s",
                    self.timeout().as_secs()
                ))
            } else {
                PriceError::UpstreamUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::UpstreamUnavailable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PriceError::UpstreamUnavailable(e.to_string()))?;

        let quotes = parse_simple_price(&body, &self.vs_currency)?;

        logger::debug(
            LogTag::Api,
            &format!(
                "CoinGecko returned {} of {} quotes in {}ms",
                quotes.len(),
                ids.len(),
                start.elapsed().as_millis()
            ),
        );

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral local port and return its base URL
    async fn spawn_upstream(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{}", addr)
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_price_url() {
        let client =
            CoinGeckoClient::new("https://example.test/api/v3/", "USD", Duration::from_secs(10))
                .unwrap();
        let url = client
            .simple_price_url(&ids(&["bitcoin", "ethereum"]))
            .unwrap();

        assert_eq!(url.path(), "/api/v3/simple/price");
        let query = url.query().unwrap();
        assert!(query.contains("ids=bitcoin%2Cethereum"));
        assert!(query.contains("vs_currencies=usd"));
        assert!(query.contains("include_24hr_change=true"));
    }

    #[test]
    fn test_default_timeout_from_config() {
        let client = CoinGeckoClient::from_config(&PricingConfig::default()).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(TIMEOUT_SECS));
        assert_eq!(client.vs_currency(), "usd");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async {
                r#"{"bitcoin": {"usd": 50000.00, "usd_24h_change": 2.5},
                    "ethereum": {"usd": 3000.00, "usd_24h_change": -1.2}}"#
            }),
        );
        let base = spawn_upstream(router).await;
        let client = CoinGeckoClient::new(&base, "usd", Duration::from_secs(5)).unwrap();

        let quotes = client
            .fetch_prices(&ids(&["bitcoin", "ethereum"]))
            .await
            .unwrap();

        assert_eq!(quotes["bitcoin"], Quote::new(50000.0, 2.5));
        assert_eq!(quotes["ethereum"], Quote::new(3000.0, -1.2));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_upstream(router).await;
        let client = CoinGeckoClient::new(&base, "usd", Duration::from_secs(5)).unwrap();

        let err = client.fetch_prices(&ids(&["bitcoin"])).await.unwrap_err();
        assert!(matches!(err, PriceError::UpstreamUnavailable(ref m) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let router = Router::new().route("/simple/price", get(|| async { "not json" }));
        let base = spawn_upstream(router).await;
        let client = CoinGeckoClient::new(&base, "usd", Duration::from_secs(5)).unwrap();

        let err = client.fetch_prices(&ids(&["bitcoin"])).await.unwrap_err();
        assert!(matches!(err, PriceError::MalformedUpstreamResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let base = spawn_upstream(router).await;
        let client = CoinGeckoClient::new(&base, "usd", Duration::from_millis(200)).unwrap();

        let err = client.fetch_prices(&ids(&["bitcoin"])).await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_fetch_empty_ids_skips_request() {
        let client = CoinGeckoClient::new("http://127.0.0.1:9", "usd", Duration::from_secs(1)).unwrap();
        assert!(client.fetch_prices(&[]).await.unwrap().is_empty());
    }
}
