/// TTL-gated price snapshot with fallback on upstream failure
///
/// The cache holds one ordered snapshot of the configured coins. A fetch is
/// attempted at most once per TTL window, measured from the last attempt
/// whether it succeeded or not. Stale callers are coalesced behind a single
/// refresh gate so only one upstream request is ever in flight.
///
/// Callers always receive independent copies of the entries.
use super::fallback::fallback_entries;
use super::types::{CoinConfig, CoinEntry, Freshness, PriceSnapshot, Quote};
use crate::apis::PriceSource;
use crate::clock::SharedClock;
use crate::errors::PriceError;
use crate::logger::{self, LogTag};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Counters reported by `/health`
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub fetches: u64,
    pub failures: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.fetches;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

#[derive(Default)]
struct CacheState {
    /// Configured order, only ever populated from real quotes
    entries: Vec<CoinEntry>,
    last_attempt: Option<Instant>,
    last_attempt_ok: bool,
}

pub struct PriceCache {
    source: Arc<dyn PriceSource>,
    clock: SharedClock,
    coins: Vec<CoinConfig>,
    ids: Vec<String>,
    ttl: Duration,
    state: RwLock<CacheState>,
    /// Held for the duration of one upstream fetch
    refresh_gate: tokio::sync::Mutex<()>,
    counters: Counters,
}

impl PriceCache {
    pub fn new(
        source: Arc<dyn PriceSource>,
        coins: Vec<CoinConfig>,
        ttl: Duration,
        clock: SharedClock,
    ) -> Self {
        let ids = coins.iter().map(|c| c.id.clone()).collect();
        Self {
            source,
            clock,
            coins,
            ids,
            ttl,
            state: RwLock::new(CacheState::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
            counters: Counters::default(),
        }
    }

    pub fn coins(&self) -> &[CoinConfig] {
        &self.coins
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Current entries; never fails, degraded data is served on upstream errors
    pub async fn get_prices(&self) -> Vec<CoinEntry> {
        self.snapshot().await.coins
    }

    /// Current entries plus where they came from
    pub async fn snapshot(&self) -> PriceSnapshot {
        if let Some(snapshot) = self.within_window() {
            logger::verbose(
                LogTag::Pricing,
                &format!("Cache hit ({} entries, {})", snapshot.coins.len(), snapshot.freshness.as_str()),
            );
            return snapshot;
        }

        let _gate = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited for the gate
        if let Some(snapshot) = self.within_window() {
            return snapshot;
        }

        self.refresh().await
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            entries: self.state.read().entries.len(),
        }
    }

    /// Serve from state without I/O if the last attempt is within the TTL
    fn within_window(&self) -> Option<PriceSnapshot> {
        let now = self.clock.now();
        let state = self.state.read();

        let last = state.last_attempt?;
        if now.saturating_duration_since(last) > self.ttl {
            return None;
        }

        self.counters.hits.fetch_add(1, Ordering::Relaxed);

        let snapshot = if state.entries.is_empty() {
            self.fallback()
        } else if state.last_attempt_ok {
            PriceSnapshot {
                coins: state.entries.clone(),
                freshness: Freshness::Cached,
            }
        } else {
            PriceSnapshot {
                coins: state.entries.clone(),
                freshness: Freshness::Stale,
            }
        };
        Some(snapshot)
    }

    /// One upstream attempt; must be called with the refresh gate held
    async fn refresh(&self) -> PriceSnapshot {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let result = self
            .source
            .fetch_prices(&self.ids)
            .await
            .and_then(|quotes| self.require_usable(quotes));

        let now = self.clock.now();
        let mut state = self.state.write();
        state.last_attempt = Some(now);

        match result {
            Ok(quotes) => {
                state.entries = merge_entries(&self.coins, &state.entries, &quotes);
                state.last_attempt_ok = true;

                let missing = self
                    .coins
                    .iter()
                    .filter(|c| !quotes.contains_key(&c.id))
                    .count();
                logger::debug(
                    LogTag::Pricing,
                    &format!(
                        "Refreshed {} coins from {} in {}ms ({} missing from response)",
                        state.entries.len(),
                        self.source.name(),
                        started.elapsed().as_millis(),
                        missing
                    ),
                );

                PriceSnapshot {
                    coins: state.entries.clone(),
                    freshness: Freshness::Live,
                }
            }
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                state.last_attempt_ok = false;

                if state.entries.is_empty() {
                    logger::warning(
                        LogTag::Pricing,
                        &format!("Price fetch failed, serving reference prices: {}", e),
                    );
                    self.fallback()
                } else {
                    logger::warning(
                        LogTag::Pricing,
                        &format!("Price fetch failed, serving cached prices: {}", e),
                    );
                    PriceSnapshot {
                        coins: state.entries.clone(),
                        freshness: Freshness::Stale,
                    }
                }
            }
        }
    }

    /// A response with no quote for any configured coin counts as a failure
    fn require_usable(
        &self,
        quotes: HashMap<String, Quote>,
    ) -> Result<HashMap<String, Quote>, PriceError> {
        if self.coins.iter().any(|c| quotes.contains_key(&c.id)) {
            Ok(quotes)
        } else {
            Err(PriceError::MalformedUpstreamResponse(
                "response contained no configured coins".to_string(),
            ))
        }
    }

    fn fallback(&self) -> PriceSnapshot {
        PriceSnapshot {
            coins: fallback_entries(&self.coins),
            freshness: Freshness::Fallback,
        }
    }
}

/// Configured order; fresh quote, else prior entry, else omitted
fn merge_entries(
    coins: &[CoinConfig],
    prior: &[CoinEntry],
    quotes: &HashMap<String, Quote>,
) -> Vec<CoinEntry> {
    coins
        .iter()
        .filter_map(|coin| match quotes.get(&coin.id) {
            Some(quote) => Some(CoinEntry::from_quote(coin, quote)),
            None => prior.iter().find(|e| e.id == coin.id).cloned(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::{system_clock, ManualClock};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    type FetchResult = Result<HashMap<String, Quote>, PriceError>;

    /// In-memory price source replaying scripted responses
    ///
    /// Once the script runs out every call fails with `UpstreamUnavailable`.
    pub(crate) struct FakeSource {
        script: Mutex<VecDeque<FetchResult>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl FakeSource {
        pub(crate) fn new(script: Vec<FetchResult>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for FakeSource {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_prices(&self, _ids: &[String]) -> FetchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(PriceError::UpstreamUnavailable("connection refused".into())))
        }
    }

    pub(crate) fn quotes(list: &[(&str, f64, f64)]) -> HashMap<String, Quote> {
        list.iter()
            .map(|(id, price, change)| (id.to_string(), Quote::new(*price, *change)))
            .collect()
    }

    fn btc_eth() -> Vec<CoinConfig> {
        vec![
            CoinConfig::new("bitcoin", "Bitcoin"),
            CoinConfig::new("ethereum", "Ethereum"),
        ]
    }

    fn cache_with(source: Arc<FakeSource>, coins: Vec<CoinConfig>, clock: &ManualClock) -> PriceCache {
        PriceCache::new(source, coins, DEFAULT_TTL, Arc::new(clock.clone()))
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let source = Arc::new(FakeSource::new(vec![Ok(quotes(&[
            ("bitcoin", 50000.0, 2.5),
            ("ethereum", 3000.0, -1.2),
        ]))]));
        let clock = ManualClock::new();
        let cache = cache_with(source.clone(), btc_eth(), &clock);

        let first = cache.snapshot().await;
        clock.advance(Duration::from_secs(10));
        let second = cache.snapshot().await;

        assert_eq!(first.freshness, Freshness::Live);
        assert_eq!(second.freshness, Freshness::Cached);
        assert_eq!(first.coins, second.coins);
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches() {
        let source = Arc::new(FakeSource::new(vec![
            Ok(quotes(&[("bitcoin", 50000.0, 2.5)])),
            Ok(quotes(&[("bitcoin", 51000.0, 3.0)])),
        ]));
        let clock = ManualClock::new();
        let cache = cache_with(source.clone(), btc_eth(), &clock);

        cache.get_prices().await;
        clock.advance(Duration::from_secs(30));
        // exactly at the TTL is still a hit
        assert_eq!(cache.get_prices().await[0].price_usd, 50000.0);
        assert_eq!(source.calls(), 1);

        clock.advance(Duration::from_millis(1));
        let refreshed = cache.get_prices().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(refreshed[0].price_usd, 51000.0);
    }

    #[tokio::test]
    async fn test_returned_entries_are_copies() {
        let source = Arc::new(FakeSource::new(vec![Ok(quotes(&[("bitcoin", 50000.0, 2.5)]))]));
        let clock = ManualClock::new();
        let cache = cache_with(source, btc_eth(), &clock);

        let mut first = cache.get_prices().await;
        first[0].price_usd = 0.0;
        first[0].display_name.push_str(" (edited)");
        first.clear();

        let second = cache.get_prices().await;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].price_usd, 50000.0);
        assert_eq!(second[0].display_name, "Bitcoin");
    }

    #[tokio::test]
    async fn test_cold_failure_serves_reference_table() {
        let source = Arc::new(FakeSource::new(vec![]));
        let coins = vec![
            CoinConfig::new("bitcoin", "Bitcoin (BTC)"),
            CoinConfig::new("made-up-coin", "Made Up"),
            CoinConfig::new("ethereum", "Ethereum (ETH)"),
        ];
        let clock = ManualClock::new();
        let cache = cache_with(source, coins, &clock);

        let snapshot = cache.snapshot().await;

        assert_eq!(snapshot.freshness, Freshness::Fallback);
        let ids: Vec<&str> = snapshot.coins.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum"]);
        assert_eq!(snapshot.coins[0].display_name, "Bitcoin (BTC)");
        assert_eq!(snapshot.coins[1].display_name, "Ethereum (ETH)");
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_failure_serves_stale_snapshot() {
        let source = Arc::new(FakeSource::new(vec![
            Ok(quotes(&[("bitcoin", 50000.0, 2.5), ("ethereum", 3000.0, -1.2)])),
            Err(PriceError::UpstreamUnavailable("HTTP 500".into())),
        ]));
        let clock = ManualClock::new();
        let cache = cache_with(source.clone(), btc_eth(), &clock);

        let live = cache.snapshot().await;
        clock.advance(Duration::from_secs(31));
        let stale = cache.snapshot().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(stale.freshness, Freshness::Stale);
        assert_eq!(stale.coins, live.coins);
    }

    #[tokio::test]
    async fn test_failed_attempt_suppresses_retry_within_ttl() {
        let source = Arc::new(FakeSource::new(vec![
            Err(PriceError::MalformedUpstreamResponse("eof".into())),
            Ok(quotes(&[("bitcoin", 50000.0, 2.5)])),
        ]));
        let clock = ManualClock::new();
        let cache = cache_with(source.clone(), btc_eth(), &clock);

        assert_eq!(cache.snapshot().await.freshness, Freshness::Fallback);
        clock.advance(Duration::from_secs(29));
        assert_eq!(cache.snapshot().await.freshness, Freshness::Fallback);
        assert_eq!(source.calls(), 1);

        clock.advance(Duration::from_secs(2));
        let recovered = cache.snapshot().await;
        assert_eq!(source.calls(), 2);
        assert_eq!(recovered.freshness, Freshness::Live);
        assert_eq!(recovered.coins[0].price_usd, 50000.0);
    }

    #[tokio::test]
    async fn test_partial_response_on_cold_start_omits_missing_coin() {
        let source = Arc::new(FakeSource::new(vec![Ok(quotes(&[("bitcoin", 50000.0, 2.5)]))]));
        let clock = ManualClock::new();
        let cache = cache_with(source, btc_eth(), &clock);

        let entries = cache.get_prices().await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "bitcoin");
        assert_eq!(entries[0].price_usd, 50000.0);
        assert_eq!(entries[0].change_24h_pct, 2.5);
    }

    #[tokio::test]
    async fn test_partial_response_keeps_prior_values() {
        let source = Arc::new(FakeSource::new(vec![
            Ok(quotes(&[("bitcoin", 49000.0, 1.0), ("ethereum", 3000.0, -1.2)])),
            Ok(quotes(&[("bitcoin", 50000.0, 2.5)])),
        ]));
        let clock = ManualClock::new();
        let cache = cache_with(source, btc_eth(), &clock);

        cache.get_prices().await;
        clock.advance(Duration::from_secs(31));
        let entries = cache.get_prices().await;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].price_usd, 50000.0);
        assert_eq!(entries[1].id, "ethereum");
        assert_eq!(entries[1].price_usd, 3000.0);
        assert_eq!(entries[1].change_24h_pct, -1.2);
    }

    #[tokio::test]
    async fn test_unusable_response_treated_as_failure() {
        let source = Arc::new(FakeSource::new(vec![Ok(quotes(&[("unrelated", 1.0, 0.0)]))]));
        let clock = ManualClock::new();
        let cache = cache_with(source, btc_eth(), &clock);

        let snapshot = cache.snapshot().await;

        assert_eq!(snapshot.freshness, Freshness::Fallback);
        assert_eq!(snapshot.coins.len(), 2);
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_entries_follow_configured_order() {
        let source = Arc::new(FakeSource::new(vec![Ok(quotes(&[
            ("solana", 150.0, 1.0),
            ("bitcoin", 50000.0, 2.5),
            ("cardano", 0.5, -0.1),
        ]))]));
        let coins = vec![
            CoinConfig::new("cardano", "Cardano"),
            CoinConfig::new("bitcoin", "Bitcoin"),
            CoinConfig::new("solana", "Solana"),
        ];
        let clock = ManualClock::new();
        let cache = cache_with(source, coins, &clock);

        let ids: Vec<String> = cache.get_prices().await.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["cardano", "bitcoin", "solana"]);
    }

    #[tokio::test]
    async fn test_concurrent_reads_on_warm_cache() {
        let source = Arc::new(FakeSource::new(vec![Ok(quotes(&[
            ("bitcoin", 50000.0, 2.5),
            ("ethereum", 3000.0, -1.2),
        ]))]));
        let cache = Arc::new(PriceCache::new(
            source.clone(),
            btc_eth(),
            DEFAULT_TTL,
            system_clock(),
        ));
        let expected = cache.get_prices().await;

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_prices().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), expected);
        }
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_stale_readers_share_one_fetch() {
        let source = Arc::new(
            FakeSource::new(vec![Ok(quotes(&[("bitcoin", 50000.0, 2.5)]))])
                .with_delay(Duration::from_millis(50)),
        );
        let cache = Arc::new(PriceCache::new(
            source.clone(),
            btc_eth(),
            DEFAULT_TTL,
            system_clock(),
        ));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_prices().await })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            let entries = result.unwrap();
            assert_eq!(entries[0].price_usd, 50000.0);
        }
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.stats().fetches, 1);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            fetches: 1,
            failures: 0,
            entries: 2,
        };
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
