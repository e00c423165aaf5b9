//! Build version metadata
//!
//! Commit and build date are optional compile-time env vars, so plain
//! `cargo build` still works and reports "unknown".

use serde::Serialize;

/// Compile-time version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COMMIT: &str = match option_env!("COINOPS_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

pub const BUILD_DATE: &str = match option_env!("COINOPS_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub commit: String,
    pub build_date: String,
}

pub fn get_version_info() -> VersionInfo {
    VersionInfo {
        version: VERSION.to_string(),
        commit: COMMIT.to_string(),
        build_date: BUILD_DATE.to_string(),
    }
}

/// One-line form for `--version` style output and startup logs
pub fn version_string() -> String {
    if COMMIT == "unknown" {
        format!("coinops {}", VERSION)
    } else {
        format!("coinops {} ({})", VERSION, COMMIT)
    }
}
