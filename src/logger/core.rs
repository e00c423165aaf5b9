/// Level filtering and dispatch to the configured output format
use super::config::{get_logger_config, LogFormat};
use super::format::{format_json_line, format_text_line, print_stdout_safe};
use super::levels::LogLevel;
use super::tags::LogTag;
use serde_json::Value;

/// Errors are always shown; everything else must be within the minimum level
pub fn should_log(level: LogLevel, min_level: LogLevel) -> bool {
    level == LogLevel::Error || level <= min_level
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    log_fields(tag, level, message, &[]);
}

pub fn log_fields(tag: LogTag, level: LogLevel, message: &str, fields: &[(&str, Value)]) {
    let config = get_logger_config();
    if !should_log(level, config.min_level) {
        return;
    }

    let line = match config.format {
        LogFormat::Json => format_json_line(chrono::Utc::now(), tag, level, message, fields),
        LogFormat::Text => format_text_line(chrono::Local::now(), tag, level, message, fields),
    };
    print_stdout_safe(&line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_log() {
        assert!(should_log(LogLevel::Error, LogLevel::Error));
        assert!(should_log(LogLevel::Warning, LogLevel::Info));
        assert!(should_log(LogLevel::Info, LogLevel::Info));
        assert!(!should_log(LogLevel::Debug, LogLevel::Info));
        assert!(should_log(LogLevel::Verbose, LogLevel::Verbose));
    }
}
