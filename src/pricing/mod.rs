/// Price snapshot for the configured coins
///
/// - `cache`: TTL-gated snapshot with single-flight refresh and fallback
/// - `fallback`: built-in reference prices for cold starts
/// - `search`: id lookup and substring search over the snapshot
pub mod cache;
pub mod fallback;
pub mod search;
pub mod types;

pub use cache::{CacheStats, PriceCache, DEFAULT_TTL};
pub use search::{filter_coins, find_coin};
pub use types::{CoinConfig, CoinEntry, Freshness, PriceSnapshot, Quote};
