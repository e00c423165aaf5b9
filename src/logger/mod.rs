//! Structured logging for CoinOps
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Subsystem tags for every message
//! - Colored console lines or one JSON object per line
//!
//! ## Usage
//!
//! ```rust
//! use coinops::logger::{self, LogLevel, LogTag};
//! use serde_json::json;
//!
//! logger::warning(LogTag::Pricing, "Price fetch failed, serving cached prices");
//! logger::info(LogTag::Webserver, "Dashboard listening on 0.0.0.0:3000");
//! logger::debug(LogTag::Api, "CoinGecko returned 5 of 5 quotes");
//!
//! logger::event(
//!     LogTag::Webserver,
//!     LogLevel::Info,
//!     "request_completed",
//!     &[("status", json!(200)), ("duration_ms", json!(3))],
//! );
//! ```
//!
//! ## Initialization
//!
//! Call once after configuration is loaded:
//! ```rust
//! coinops::logger::init("info", "json", false, false);
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

use serde_json::Value;

pub use config::{get_logger_config, resolve_logger_config, set_logger_config, LogFormat, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Configure level and format from config values and CLI flags
pub fn init(level: &str, format: &str, debug: bool, verbose: bool) {
    set_logger_config(resolve_logger_config(level, format, debug, verbose));
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (degraded but working)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level, shown with `logging.level = "debug"` or `--debug`
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level, shown only with `--verbose`
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Emit a named event with structured key/value fields
///
/// In JSON mode the fields become top-level keys of the record; in text
/// mode they are appended as `key=value` pairs.
pub fn event(tag: LogTag, level: LogLevel, name: &str, fields: &[(&str, Value)]) {
    core::log_fields(tag, level, name, fields);
}
