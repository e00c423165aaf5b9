/// Webserver middleware
///
/// Applied outermost first: request id, request logging, panic recovery,
/// IP allowlist, session auth. See `server::build_app`.
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::any::Any;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    auth::parse_basic_auth,
    logger::{self, LogLevel, LogTag},
    sessions::SESSION_COOKIE_NAME,
    webserver::{
        state::AppState,
        utils::{self, client_ip, get_cookie, is_ajax_request},
    },
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Paths reachable without a session (prefix match)
const PUBLIC_PATHS: [&str; 5] = ["/login", "/auth", "/logout", "/assets/", "/health"];

/// Request id carried in request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

fn peer_addr(request: &Request) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Echo `X-Request-ID` or assign a fresh uuid
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// `request_started` / `request_completed` events with timing
pub async fn request_logging(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let ip = client_ip(request.headers(), peer_addr(&request)).unwrap_or_else(|| "unknown".to_string());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    logger::event(
        LogTag::Webserver,
        LogLevel::Info,
        "request_started",
        &[
            ("request_id", json!(request_id)),
            ("method", json!(method)),
            ("path", json!(path)),
            ("ip", json!(ip)),
            ("user_agent", json!(user_agent)),
        ],
    );

    let response = next.run(request).await;

    logger::event(
        LogTag::Webserver,
        LogLevel::Info,
        "request_completed",
        &[
            ("request_id", json!(request_id)),
            ("method", json!(method)),
            ("path", json!(path)),
            ("status", json!(response.status().as_u16())),
            ("duration_ms", json!(start.elapsed().as_micros() as f64 / 1000.0)),
        ],
    );

    response
}

/// Panic handler for `CatchPanicLayer`
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> axum::http::Response<String> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    logger::event(
        LogTag::Webserver,
        LogLevel::Error,
        "panic_recovered",
        &[("panic", json!(detail))],
    );

    let mut response = axum::http::Response::new("Internal Server Error".to_string());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Reject clients outside the configured networks (when enabled)
pub async fn ip_allowlist(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    if !state.allowlist_enabled() {
        return next.run(request).await;
    }

    let ip = client_ip(request.headers(), peer_addr(&request));
    let parsed = ip.as_deref().and_then(|s| s.parse::<IpAddr>().ok());

    match parsed {
        Some(addr) if state.allowlist.iter().any(|net| net.contains(&addr)) => {
            next.run(request).await
        }
        Some(_) => {
            logger::event(
                LogTag::Webserver,
                LogLevel::Warning,
                "ip_blocked",
                &[("ip", json!(ip))],
            );
            utils::text_response(StatusCode::FORBIDDEN, "Forbidden")
        }
        None => {
            logger::event(
                LogTag::Webserver,
                LogLevel::Warning,
                "invalid_client_ip",
                &[("ip", json!(ip.unwrap_or_default()))],
            );
            utils::text_response(StatusCode::FORBIDDEN, "Forbidden")
        }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| path.starts_with(public))
}

/// Require a session cookie or Basic Auth (when enabled)
///
/// htmx/XHR callers get 401; browsers are redirected to the login page with
/// the original path as `redirect`.
pub async fn session_auth(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if is_public_path(&path) || !state.auth_enabled() {
        return next.run(request).await;
    }

    let has_session = get_cookie(request.headers(), SESSION_COOKIE_NAME)
        .and_then(|id| state.sessions.get(&id))
        .is_some();
    if has_session {
        return next.run(request).await;
    }

    let basic_ok = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_auth)
        .map_or(false, |(user, pass)| state.verify_credentials(&user, &pass));
    if basic_ok {
        return next.run(request).await;
    }

    let ip = client_ip(request.headers(), peer_addr(&request)).unwrap_or_default();
    logger::event(
        LogTag::Auth,
        LogLevel::Warning,
        "auth_required",
        &[("path", json!(path)), ("ip", json!(ip))],
    );

    if is_ajax_request(request.headers()) {
        return utils::text_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    Redirect::to(&format!("/login?redirect={}", path)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/login"));
        assert!(is_public_path("/auth"));
        assert!(is_public_path("/assets/app.js"));
        assert!(is_public_path("/health"));
        assert!(!is_public_path("/"));
        assert!(!is_public_path("/ticker"));
        assert!(!is_public_path("/metadata"));
    }

    #[test]
    fn test_panic_response() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), "Internal Server Error");
    }
}
