use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::apis::{CoinGeckoClient, PriceSource};
use crate::auth::Credentials;
use crate::clock::{system_clock, SharedClock};
use crate::config::Config;
use crate::errors::{CoinOpsError, CoinOpsResult};
use crate::pricing::PriceCache;

/// One-shot price listing, gated on the same credentials as the dashboard
pub async fn run(config: Config, username: &str, password: &str) -> CoinOpsResult<()> {
    let source: Arc<dyn PriceSource> = Arc::new(CoinGeckoClient::from_config(&config.pricing)?);

    list_prices(
        &config,
        Credentials::from_env().as_ref(),
        username,
        password,
        source,
        system_clock(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn list_prices<O: Write, E: Write>(
    config: &Config,
    credentials: Option<&Credentials>,
    username: &str,
    password: &str,
    source: Arc<dyn PriceSource>,
    clock: SharedClock,
    out: &mut O,
    err: &mut E,
) -> CoinOpsResult<()> {
    let credentials = credentials.ok_or_else(|| {
        CoinOpsError::Auth("authentication not configured: run 'coinops genenv' first".to_string())
    })?;
    if !credentials.verify(username, password) {
        return Err(CoinOpsError::Auth(
            "authentication failed: invalid credentials".to_string(),
        ));
    }

    writeln!(err, "Config source: {}", config.source)?;
    writeln!(err, "Coins configured: {}", config.coins.len())?;
    writeln!(err, "Timestamp: {}", clock.utc_now().to_rfc3339())?;
    for (i, coin) in config.coins.iter().enumerate() {
        writeln!(err, "  {}. {} ({})", i + 1, coin.display_name, coin.id)?;
    }

    writeln!(err, "Fetching prices...")?;
    let cache = PriceCache::new(
        source,
        config.coins.clone(),
        Duration::from_secs(config.pricing.cache_ttl_secs),
        clock,
    );
    let snapshot = cache.snapshot().await;
    writeln!(err, "Received {} price entries", snapshot.coins.len())?;
    if snapshot.freshness.is_degraded() {
        writeln!(
            err,
            "Warning: live prices unavailable, showing {} values",
            snapshot.freshness.as_str()
        )?;
    }

    writeln!(out, "ID\tDISPLAY_NAME\tUSD\t24H_CHANGE")?;
    for coin in &snapshot.coins {
        writeln!(
            out,
            "{}\t{}\t{:.2}\t{:.2}%",
            coin.id, coin.display_name, coin.price_usd, coin.change_24h_pct
        )?;
    }
    out.flush()?;
    Ok(())
}
