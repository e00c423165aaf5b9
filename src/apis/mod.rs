/// Upstream price APIs
///
/// `PriceSource` is the seam between the price cache and the network: the
/// cache only ever sees a map of coin id to quote, or an error.
pub mod client;
pub mod coingecko;

use crate::errors::PriceError;
use crate::pricing::types::Quote;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch quotes for the given ids in a single request.
    ///
    /// Ids missing from the result are simply absent from the map.
    async fn fetch_prices(&self, ids: &[String]) -> Result<HashMap<String, Quote>, PriceError>;
}

pub use coingecko::CoinGeckoClient;
