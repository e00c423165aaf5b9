use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::logger::{self, LogLevel, LogTag};
use crate::webserver::{state::AppState, templates};

pub const REPORT_TITLE: &str = "Report Ready";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-report", post(generate_report))
        .route("/notifications", get(list_notifications))
}

/// Simulated compliance report
///
/// Waits `features.report_delay_ms`, then records a notification.
async fn generate_report(State(state): State<Arc<AppState>>) -> Html<String> {
    let delay = Duration::from_millis(state.config.features.report_delay_ms);
    tokio::time::sleep(delay).await;

    let timestamp = state.clock.utc_now().format("%Y%m%d_%H%M%S").to_string();
    let message = format!("Compliance report {} generated successfully", timestamp);
    let notification = state.notifications.add(REPORT_TITLE, &message);

    logger::event(
        LogTag::Notifications,
        LogLevel::Info,
        "report_generated",
        &[
            ("report", json!(timestamp)),
            ("notification_id", json!(notification.id)),
        ],
    );

    Html(templates::report_success(
        &timestamp,
        state.notifications.count(),
    ))
}

async fn list_notifications(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(templates::notifications_list(&state.notifications.get_all()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webserver::routes::{create_router, test_support::*};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_generate_report_adds_notification() {
        let state = test_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(Request::post("/generate-report").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("generated successfully"));

        let all = state.notifications.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, REPORT_TITLE);
        assert!(all[0].message.starts_with("Compliance report "));
    }

    #[tokio::test]
    async fn test_generate_report_get_is_405() {
        let response = create_router(test_state())
            .oneshot(Request::get("/generate-report").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_notifications_newest_first() {
        let state = test_state();
        state.notifications.add("First", "one");
        state.notifications.add("Second", "two");

        let response = create_router(state)
            .oneshot(Request::get("/notifications").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_string(response).await;

        let second = body.find("Second").unwrap();
        let first = body.find("First").unwrap();
        assert!(second < first);
    }
}
