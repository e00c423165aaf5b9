/// Shared application state for the webserver
///
/// Everything a handler needs is injected here at startup: config, the
/// price cache, stores, and the credentials resolved from the environment.
use crate::apis::PriceSource;
use crate::auth::Credentials;
use crate::clock::SharedClock;
use crate::config::Config;
use crate::logger::{self, LogTag};
use crate::notifications::NotificationStore;
use crate::pricing::PriceCache;
use crate::refresh::RefreshScheduler;
use crate::sessions::SessionStore;
use crate::webserver::utils::IpNetwork;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state passed to all route handlers
pub struct AppState {
    pub config: Arc<Config>,
    pub prices: Arc<PriceCache>,
    pub scheduler: Arc<RefreshScheduler>,
    pub sessions: Arc<SessionStore>,
    pub notifications: Arc<NotificationStore>,

    /// `None` when no credentials are configured; logins then always fail
    pub credentials: Option<Credentials>,

    /// Parsed `security.ip_allowlist.cidrs`; invalid entries are skipped
    pub allowlist: Vec<IpNetwork>,

    /// Reported by /metadata
    pub environment: String,

    pub clock: SharedClock,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn PriceSource>,
        credentials: Option<Credentials>,
        environment: String,
        clock: SharedClock,
    ) -> Self {
        let prices = PriceCache::new(
            source,
            config.coins.clone(),
            Duration::from_secs(config.pricing.cache_ttl_secs),
            clock.clone(),
        );
        let scheduler = RefreshScheduler::new(config.features.avg_refresh_interval_ms as f64);
        let sessions = SessionStore::new(
            clock.clone(),
            Duration::from_secs(config.sessions.timeout_hours * 60 * 60),
        );
        let notifications = NotificationStore::new(clock.clone());
        let allowlist = parse_allowlist(&config.security.ip_allowlist.cidrs);

        Self {
            config: Arc::new(config),
            prices: Arc::new(prices),
            scheduler: Arc::new(scheduler),
            sessions: Arc::new(sessions),
            notifications: Arc::new(notifications),
            credentials,
            allowlist,
            environment,
            startup_time: clock.utc_now(),
            clock,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.config.security.basic_auth.enabled
    }

    pub fn allowlist_enabled(&self) -> bool {
        self.config.security.ip_allowlist.enabled
    }

    pub fn uptime(&self) -> Duration {
        (self.clock.utc_now() - self.startup_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Valid credentials for either the login form or Basic Auth
    pub fn verify_credentials(&self, username: &str, password: &str) -> bool {
        self.credentials
            .as_ref()
            .map_or(false, |c| c.verify(username, password))
    }
}

fn parse_allowlist(cidrs: &[String]) -> Vec<IpNetwork> {
    let networks: Vec<IpNetwork> = cidrs
        .iter()
        .filter_map(|cidr| match IpNetwork::parse(cidr) {
            Ok(net) => Some(net),
            Err(e) => {
                logger::warning(LogTag::Webserver, &format!("Ignoring invalid CIDR: {}", e));
                None
            }
        })
        .collect();

    logger::debug(
        LogTag::Webserver,
        &format!("IP allowlist has {} networks", networks.len()),
    );
    networks
}

/// `ENVIRONMENT`, else `ENV`, else "production"
pub fn resolve_environment<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("ENVIRONMENT")
        .filter(|v| !v.is_empty())
        .or_else(|| lookup("ENV").filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "production".to_string())
}
