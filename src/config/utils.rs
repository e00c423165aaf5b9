/// Configuration utilities - loading, environment overrides and validation
///
/// Precedence, lowest first: schema defaults, `config.toml` (or the
/// `--config` path), `COINOPS_*` environment variables, CLI flags. The CLI
/// layer is applied by the command runners.
use super::schemas::{Config, ConfigSource};
use crate::errors::{CoinOpsError, CoinOpsResult};
use crate::logger::{self, LogTag};
use std::collections::HashSet;
use std::path::Path;

/// Default configuration file path, relative to the working directory
pub const CONFIG_FILE_PATH: &str = "config.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "COINOPS_";

/// Load, override from the process environment, and validate
///
/// An explicit path must exist. Without one, a missing `config.toml` means
/// defaults.
pub fn load_config(explicit: Option<&Path>) -> CoinOpsResult<Config> {
    let mut config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CoinOpsError::Config(format!(
                    "Config file '{}' not found",
                    path.display()
                )));
            }
            load_config_from_path(path)?
        }
        None => {
            let path = Path::new(CONFIG_FILE_PATH);
            if path.exists() {
                load_config_from_path(path)?
            } else {
                logger::warning(
                    LogTag::Config,
                    &format!("Config file '{}' not found, using default values", CONFIG_FILE_PATH),
                );
                Config::default()
            }
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a TOML file; the result records the path as its source
pub fn load_config_from_path(path: &Path) -> CoinOpsResult<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CoinOpsError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
    })?;

    let mut config = toml::from_str::<Config>(&contents)?;
    config.source = ConfigSource::File(path.to_path_buf());
    Ok(config)
}

/// Apply `COINOPS_*` overrides read through `lookup`
///
/// Unparseable numeric values are a config error rather than silently
/// ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> CoinOpsResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.is_empty());

    if let Some(host) = var("SERVER_HOST") {
        config.server.host = host;
    }
    if let Some(port) = var("SERVER_PORT") {
        config.server.port = parse_env("SERVER_PORT", &port)?;
    }
    if let Some(level) = var("LOGGING_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = var("LOGGING_FORMAT") {
        config.logging.format = format;
    }
    if let Some(ms) = var("FEATURES_AVG_REFRESH_INTERVAL_MS") {
        config.features.avg_refresh_interval_ms = parse_env("FEATURES_AVG_REFRESH_INTERVAL_MS", &ms)?;
    }
    if let Some(key) = lookup("COINGECKO_API_KEY").filter(|v| !v.is_empty()) {
        config.pricing.api_key = Some(key);
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> CoinOpsResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        CoinOpsError::Config(format!("Invalid value '{}' for {}{}", value, ENV_PREFIX, name))
    })
}

pub fn validate_config(config: &Config) -> CoinOpsResult<()> {
    if config.server.port == 0 {
        return Err(CoinOpsError::Config("server.port must be non-zero".to_string()));
    }

    if !matches!(config.logging.format.to_lowercase().as_str(), "json" | "text") {
        return Err(CoinOpsError::Config(format!(
            "logging.format must be 'json' or 'text', got '{}'",
            config.logging.format
        )));
    }

    if config.pricing.cache_ttl_secs == 0 {
        return Err(CoinOpsError::Config("pricing.cache_ttl_secs must be greater than zero".to_string()));
    }

    let mut seen = HashSet::new();
    for coin in &config.coins {
        if coin.id.trim().is_empty() {
            return Err(CoinOpsError::Config("coin id must not be empty".to_string()));
        }
        if !seen.insert(coin.id.as_str()) {
            return Err(CoinOpsError::Config(format!("duplicate coin id '{}'", coin.id)));
        }
    }

    Ok(())
}
