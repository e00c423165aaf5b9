use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::pricing::CacheStats;
use crate::version;
use crate::webserver::state::AppState;

// =============================================================================
// RESPONSE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct FeaturesMetadata {
    pub avg_refresh_interval_ms: u64,
    pub report_delay_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub version: String,
    pub commit: String,
    pub build_date: String,
    pub environment: String,
    pub features: FeaturesMetadata,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub sessions: usize,
    pub cache: CacheStats,
    pub cache_hit_rate: f64,
}

// =============================================================================
// ROUTES
// =============================================================================

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metadata", get(metadata))
        .route("/health", get(health))
}

async fn metadata(State(state): State<Arc<AppState>>) -> Json<MetadataResponse> {
    let info = version::get_version_info();
    Json(MetadataResponse {
        version: info.version,
        commit: info.commit,
        build_date: info.build_date,
        environment: state.environment.clone(),
        features: FeaturesMetadata {
            avg_refresh_interval_ms: state.config.features.avg_refresh_interval_ms,
            report_delay_ms: state.config.features.report_delay_ms,
        },
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime_seconds = state.uptime().as_secs();
    let cache = state.prices.stats();
    Json(HealthResponse {
        status: "ok",
        uptime: format_uptime(uptime_seconds),
        uptime_seconds,
        version: version::VERSION.to_string(),
        sessions: state.sessions.count(),
        cache_hit_rate: cache.hit_rate(),
        cache,
    })
}

/// `1d 2h 3m 4s`, leading zero units omitted
pub fn format_uptime(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
