/// Process-wide logger settings
///
/// Starts as text output at INFO so anything logged before `init` (config
/// loading, mostly) still reaches the console.
use super::levels::LogLevel;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Output encoding for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored, human-oriented console line
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "console" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            format: LogFormat::Text,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    *LOGGER_CONFIG.read()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build settings from config strings plus CLI flags.
///
/// `--verbose` wins over `--debug`, and both win over the configured level.
/// Unknown strings fall back to the defaults.
pub fn resolve_logger_config(level: &str, format: &str, debug: bool, verbose: bool) -> LoggerConfig {
    let defaults = LoggerConfig::default();

    let min_level = if verbose {
        LogLevel::Verbose
    } else if debug {
        LogLevel::Debug
    } else {
        LogLevel::from_str(level).unwrap_or(defaults.min_level)
    };

    LoggerConfig {
        min_level,
        format: LogFormat::from_str(format).unwrap_or(defaults.format),
    }
}
