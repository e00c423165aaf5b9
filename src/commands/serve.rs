use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::apis::{CoinGeckoClient, PriceSource};
use crate::auth::Credentials;
use crate::clock::system_clock;
use crate::commands::genenv::print_credentials_banner;
use crate::config::{validate_config, Config};
use crate::errors::CoinOpsResult;
use crate::logger::{self, LogLevel, LogTag};
use crate::version;
use crate::webserver::{self, state::resolve_environment, AppState};

pub async fn run(mut config: Config, host: Option<String>, port: Option<u16>) -> CoinOpsResult<()> {
    apply_cli_overrides(&mut config, host, port);
    validate_config(&config)?;

    let credentials = resolve_credentials(&config)?;
    let environment = resolve_environment(|key| std::env::var(key).ok());
    let source: Arc<dyn PriceSource> = Arc::new(CoinGeckoClient::from_config(&config.pricing)?);

    log_startup_diagnostics(&config, &environment, credentials.is_some());

    let cleanup_interval = Duration::from_secs(config.sessions.cleanup_interval_secs);
    let state = Arc::new(AppState::new(
        config,
        source,
        credentials,
        environment,
        system_clock(),
    ));
    state.sessions.start_cleanup(cleanup_interval);
    log_pricing_setup(&state);

    webserver::start_server(state).await
}

/// `--host` and `--port` win over file and environment values
pub fn apply_cli_overrides(config: &mut Config, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

/// Env credentials, or a fresh generated pair when auth is on and none are set
fn resolve_credentials(config: &Config) -> CoinOpsResult<Option<Credentials>> {
    if let Some(credentials) = Credentials::from_env() {
        return Ok(Some(credentials));
    }
    if !config.security.basic_auth.enabled {
        return Ok(None);
    }

    logger::warning(
        LogTag::Auth,
        "Basic auth enabled but no credentials configured, generating a temporary pair",
    );
    let generated = crate::auth::generate_credentials()?;
    print_credentials_banner(&generated);
    Ok(Some(generated.credentials))
}

fn log_startup_diagnostics(config: &Config, environment: &str, has_credentials: bool) {
    logger::event(
        LogTag::System,
        LogLevel::Info,
        "startup_diagnostics",
        &[
            ("version", json!(version::version_string())),
            ("environment", json!(environment)),
            ("config_source", json!(config.source.to_string())),
            ("listen_addr", json!(config.listen_addr())),
            ("coins", json!(config.coin_ids())),
            ("cache_ttl_secs", json!(config.pricing.cache_ttl_secs)),
            (
                "avg_refresh_interval_ms",
                json!(config.features.avg_refresh_interval_ms),
            ),
            ("basic_auth", json!(config.security.basic_auth.enabled)),
            ("credentials", json!(has_credentials)),
            ("ip_allowlist", json!(config.security.ip_allowlist.enabled)),
        ],
    );
}

fn log_pricing_setup(state: &AppState) {
    logger::info(
        LogTag::Pricing,
        &format!(
            "Tracking {} coins from {} (cache ttl {}s)",
            state.prices.coins().len(),
            state.prices.source_name(),
            state.prices.ttl().as_secs()
        ),
    );
    logger::debug(
        LogTag::Refresh,
        &format!(
            "Row refresh delays average {}ms",
            state.scheduler.target_mean_ms()
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        apply_cli_overrides(&mut config, Some("127.0.0.1".to_string()), Some(8080));
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");

        let mut config = Config::default();
        apply_cli_overrides(&mut config, None, None);
        assert_eq!(config, Config::default());
    }
}
