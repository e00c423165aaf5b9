/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is declared through `config_struct!`, so every section can be
/// omitted from `config.toml` and individual keys fall back to the values
/// below.
use crate::config_struct;
use crate::pricing::types::CoinConfig;
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// SERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// HTTP listener settings
    pub struct ServerConfig {
        host: String = "0.0.0.0".to_string(),
        port: u16 = 3000,
    }
}

// ============================================================================
// LOGGING CONFIGURATION
// ============================================================================

config_struct! {
    pub struct LoggingConfig {
        /// error | warn | info | debug | verbose
        level: String = "info".to_string(),
        /// json | text
        format: String = "json".to_string(),
    }
}

// ============================================================================
// FEATURES CONFIGURATION
// ============================================================================

config_struct! {
    /// Client-visible timing knobs
    pub struct FeaturesConfig {
        /// Mean of the per-row refresh delays
        avg_refresh_interval_ms: u64 = 5000,
        /// Simulated work time of POST /generate-report
        report_delay_ms: u64 = 3000,
    }
}

// ============================================================================
// PRICING CONFIGURATION
// ============================================================================

config_struct! {
    /// Upstream quote source and cache policy
    pub struct PricingConfig {
        api_base_url: String = crate::apis::coingecko::COINGECKO_BASE_URL.to_string(),
        vs_currency: String = "usd".to_string(),
        cache_ttl_secs: u64 = 30,
        request_timeout_secs: u64 = crate::apis::coingecko::TIMEOUT_SECS,
        /// Optional demo-tier key, usually supplied as COINGECKO_API_KEY
        #[serde(skip_serializing_if = "Option::is_none")]
        api_key: Option<String> = None,
    }
}

// ============================================================================
// SECURITY CONFIGURATION
// ============================================================================

config_struct! {
    /// Session login / Basic Auth gate. Credentials come from the
    /// environment, never from this file.
    pub struct BasicAuthConfig {
        enabled: bool = false,
    }
}

config_struct! {
    pub struct IpAllowlistConfig {
        enabled: bool = false,
        cidrs: Vec<String> = vec![
            // IPv4 loopback and private ranges
            "127.0.0.0/8".to_string(),
            "10.0.0.0/8".to_string(),
            "172.16.0.0/12".to_string(),
            "192.168.0.0/16".to_string(),
            // IPv6 loopback, unique local, link-local
            "::1/128".to_string(),
            "fc00::/7".to_string(),
            "fe80::/10".to_string(),
        ],
    }
}

config_struct! {
    pub struct SecurityConfig {
        basic_auth: BasicAuthConfig = BasicAuthConfig::default(),
        ip_allowlist: IpAllowlistConfig = IpAllowlistConfig::default(),
    }
}

// ============================================================================
// SESSIONS CONFIGURATION
// ============================================================================

config_struct! {
    pub struct SessionsConfig {
        timeout_hours: u64 = 24,
        cleanup_interval_secs: u64 = 3600,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

/// Where the active configuration was read from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Defaults,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Defaults => write!(f, "defaults-only"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn default_coins() -> Vec<CoinConfig> {
    vec![
        CoinConfig::new("bitcoin", "Bitcoin"),
        CoinConfig::new("ethereum", "Ethereum"),
        CoinConfig::new("dogecoin", "Doge"),
        CoinConfig::new("solana", "Solana"),
        CoinConfig::new("cardano", "Cardano"),
    ]
}

config_struct! {
    /// Root configuration
    pub struct Config {
        server: ServerConfig = ServerConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
        /// Tracked coins, in display order
        coins: Vec<CoinConfig> = default_coins(),
        features: FeaturesConfig = FeaturesConfig::default(),
        pricing: PricingConfig = PricingConfig::default(),
        security: SecurityConfig = SecurityConfig::default(),
        sessions: SessionsConfig = SessionsConfig::default(),
        #[serde(skip)]
        source: ConfigSource = ConfigSource::Defaults,
    }
}

impl Config {
    pub fn coin_ids(&self) -> Vec<String> {
        self.coins.iter().map(|c| c.id.clone()).collect()
    }

    pub fn listen_addr(&self) -> String {
        if self.server.host.contains(':') && !self.server.host.starts_with('[') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }
}
