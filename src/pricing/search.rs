/// Lookup and search over the current price snapshot
///
/// No state of its own: every call goes through `PriceCache::snapshot`, so
/// TTL and fallback behaviour are exactly the cache's.
use super::cache::PriceCache;
use super::types::{CoinEntry, PriceSnapshot};
use crate::errors::PriceError;

/// Exact id match within a set of entries
pub fn find_coin(entries: &[CoinEntry], id: &str) -> Result<CoinEntry, PriceError> {
    entries
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .ok_or_else(|| PriceError::not_found(id))
}

/// Case-insensitive substring filter over id and display name.
///
/// An empty query keeps everything; whitespace is matched like any other
/// text. Order is preserved and each entry appears at most once.
pub fn filter_coins(entries: Vec<CoinEntry>, query: &str) -> Vec<CoinEntry> {
    if query.is_empty() {
        return entries;
    }
    let folded = query.to_lowercase();
    entries.into_iter().filter(|e| e.matches(&folded)).collect()
}

impl PriceCache {
    pub async fn get_coin(&self, id: &str) -> Result<CoinEntry, PriceError> {
        find_coin(&self.get_prices().await, id)
    }

    pub async fn search_coins(&self, query: &str) -> Vec<CoinEntry> {
        filter_coins(self.get_prices().await, query)
    }

    /// Search that keeps the snapshot freshness, for the dashboard indicator
    pub async fn search_snapshot(&self, query: &str) -> PriceSnapshot {
        let snapshot = self.snapshot().await;
        PriceSnapshot {
            coins: filter_coins(snapshot.coins, query),
            freshness: snapshot.freshness,
        }
    }
}
