use crate::webserver::{state::AppState, templates, utils};
use crate::version;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

pub mod auth;
pub mod notifications;
pub mod system;
pub mod ticker;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .merge(ticker::routes())
        .merge(notifications::routes())
        .merge(auth::routes())
        .merge(system::routes())
        .fallback(not_found)
        .with_state(state)
}

/// Dashboard page handler
async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let ctx = templates::PageContext {
        notification_count: state.notifications.count(),
        avg_refresh_ms: state.config.features.avg_refresh_interval_ms,
        version: version::VERSION,
        commit: version::COMMIT,
        show_logout: state.auth_enabled(),
    };
    Html(templates::base_template(
        "Dashboard",
        &ctx,
        &templates::dashboard_content(),
    ))
}

async fn not_found() -> Response {
    utils::text_response(StatusCode::NOT_FOUND, "Not Found")
}
