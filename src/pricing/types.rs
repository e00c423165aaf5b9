use serde::{Deserialize, Serialize};

/// One configured coin: upstream id plus the label shown in the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinConfig {
    pub id: String,
    pub display_name: String,
}

impl CoinConfig {
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Latest known price data for one tracked coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinEntry {
    pub id: String,
    pub display_name: String,
    pub price_usd: f64,
    pub change_24h_pct: f64,
}

impl CoinEntry {
    pub fn from_quote(coin: &CoinConfig, quote: &Quote) -> Self {
        Self {
            id: coin.id.clone(),
            display_name: coin.display_name.clone(),
            price_usd: quote.price,
            change_24h_pct: quote.change_24h_pct,
        }
    }

    /// Case-folded substring match against id or display name
    pub fn matches(&self, folded_query: &str) -> bool {
        self.id.to_lowercase().contains(folded_query)
            || self.display_name.to_lowercase().contains(folded_query)
    }
}

/// Price + 24h change for one coin as returned by a price source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change_24h_pct: f64,
}

impl Quote {
    pub fn new(price: f64, change_24h_pct: f64) -> Self {
        Self {
            price,
            change_24h_pct,
        }
    }
}

/// Where the entries of a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Fetched from upstream during this call
    Live,
    /// Served from cache within the TTL window
    Cached,
    /// Upstream failed, previous snapshot served unchanged
    Stale,
    /// Upstream failed on cold start, built from the reference table
    Fallback,
}

impl Freshness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::Live => "live",
            Freshness::Cached => "cached",
            Freshness::Stale => "stale",
            Freshness::Fallback => "fallback",
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Freshness::Stale | Freshness::Fallback)
    }
}

/// Independent copy of the cache contents handed to callers
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub coins: Vec<CoinEntry>,
    pub freshness: Freshness,
}
