//! Log line formatting
//!
//! Text lines are colored for the console; JSON lines carry `time`, `level`,
//! `tag` and `msg` plus any structured fields at the top level.

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use colored::*;
use serde_json::{Map, Value};
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LOG_TYPE_WIDTH: usize = 7;

/// Keys owned by the record itself; fields with these names are prefixed
const RESERVED_KEYS: [&str; 4] = ["time", "level", "tag", "msg"];

pub fn format_text_line(
    now: DateTime<Local>,
    tag: LogTag,
    level: LogLevel,
    message: &str,
    fields: &[(&str, Value)],
) -> String {
    let time = now.format("%H:%M:%S").to_string().dimmed();

    let mut line = format!(
        "{} [{}] [{}] {}",
        time,
        format_tag(&tag),
        format_log_type(level),
        message
    );

    for (key, value) in fields {
        line.push(' ');
        line.push_str(&format!("{}={}", key.dimmed(), text_value(value)));
    }
    line
}

pub fn format_json_line(
    now: DateTime<Utc>,
    tag: LogTag,
    level: LogLevel,
    message: &str,
    fields: &[(&str, Value)],
) -> String {
    let mut record = Map::new();
    record.insert(
        "time".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    record.insert("level".to_string(), Value::String(level.as_json_str().to_string()));
    record.insert("tag".to_string(), Value::String(tag.to_key().to_string()));
    record.insert("msg".to_string(), Value::String(message.to_string()));

    for (key, value) in fields {
        let key = if RESERVED_KEYS.contains(key) {
            format!("field_{}", key)
        } else {
            key.to_string()
        };
        record.insert(key, value.clone());
    }

    Value::Object(record).to_string()
}

/// Strings print bare, everything else as compact JSON
fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format a tag with appropriate color
fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Pricing => label.bright_cyan().bold(),
        LogTag::Api => label.bright_purple().bold(),
        LogTag::Refresh => label.bright_blue().bold(),
        LogTag::Webserver => label.bright_green().bold(),
        LogTag::Auth => label.bright_red().bold(),
        LogTag::Sessions => label.bright_magenta().bold(),
        LogTag::Notifications => label.white().bold(),
    }
}

/// Format log type with appropriate color
fn format_log_type(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LOG_TYPE_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.bright_yellow().bold(),
        _ => label.white().bold(),
    }
}

/// Print to stdout but ignore broken pipe errors
pub fn print_stdout_safe(message: &str) {
    let mut out = stdout().lock();
    if let Err(e) = writeln!(out, "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = out.flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_json_line_shape() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let line = format_json_line(
            now,
            LogTag::Webserver,
            LogLevel::Info,
            "request_completed",
            &[("status", json!(200)), ("path", json!("/ticker"))],
        );

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["time"], "2024-05-01T12:30:00.000Z");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["tag"], "webserver");
        assert_eq!(parsed["msg"], "request_completed");
        assert_eq!(parsed["status"], 200);
        assert_eq!(parsed["path"], "/ticker");
    }

    #[test]
    fn test_json_reserved_field_names_do_not_clobber() {
        let line = format_json_line(
            Utc::now(),
            LogTag::Auth,
            LogLevel::Warning,
            "login_failed",
            &[("msg", json!("bad password"))],
        );

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["msg"], "login_failed");
        assert_eq!(parsed["field_msg"], "bad password");
    }

    #[test]
    fn test_text_line_contains_fields() {
        colored::control::set_override(false);
        let line = format_text_line(
            Local::now(),
            LogTag::Pricing,
            LogLevel::Debug,
            "refreshed",
            &[("coins", json!(5)), ("source", json!("coingecko"))],
        );

        assert!(line.contains("[PRICING   ]"));
        assert!(line.contains("[DEBUG  ]"));
        assert!(line.contains("refreshed coins=5 source=coingecko"));
    }
}
