/// Structured error types for CoinOps
///
/// `PriceError` covers the pricing core (upstream fetch and lookups).
/// `CoinOpsError` covers everything around it: configuration, credentials,
/// sessions and server startup.
use thiserror::Error;

// =============================================================================
// PRICING ERRORS
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    /// Requested coin id is not part of the current snapshot
    #[error("coin not found: {id}")]
    NotFound { id: String },

    /// Transport failure, timeout or non-2xx response from the quote endpoint
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Quote endpoint answered but the body could not be decoded
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// The HTTP client itself could not be constructed
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

impl PriceError {
    pub fn not_found(id: &str) -> Self {
        PriceError::NotFound { id: id.to_string() }
    }

    /// Fetch-step failures are absorbed by the fallback policy and never
    /// reach callers of the cache.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PriceError::UpstreamUnavailable(_) | PriceError::MalformedUpstreamResponse(_)
        )
    }
}

// =============================================================================
// APPLICATION ERRORS
// =============================================================================

#[derive(Error, Debug)]
pub enum CoinOpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PriceError),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoinOpsResult<T> = Result<T, CoinOpsError>;
