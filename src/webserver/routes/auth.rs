/// Login, form authentication and logout
use axum::{
    extract::{rejection::FormRejection, Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::logger::{self, LogLevel, LogTag};
use crate::sessions::{Session, SESSION_COOKIE_NAME};
use crate::webserver::{
    state::AppState,
    templates,
    utils::{self, get_cookie, safe_redirect_target},
};

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Missing fields decode as empty and fail the credential check
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth", post(authenticate))
        .route("/logout", get(logout))
}

fn session_cookie(session: &Session, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}; Expires={}",
        SESSION_COOKIE_NAME,
        session.id,
        max_age_secs,
        session.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
    )
}

fn cleared_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    )
}

fn has_valid_session(state: &AppState, headers: &HeaderMap) -> bool {
    get_cookie(headers, SESSION_COOKIE_NAME)
        .and_then(|id| state.sessions.get(&id))
        .is_some()
}

async fn login_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RedirectQuery>,
) -> Response {
    if has_valid_session(&state, &headers) {
        return Redirect::to("/").into_response();
    }

    let target = safe_redirect_target(query.redirect.as_deref());
    Html(templates::login_page(&target)).into_response()
}

/// Form login; answers JSON so the login page can show errors inline
async fn authenticate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RedirectQuery>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => {
            logger::debug(LogTag::Auth, &format!("Rejected login form: {}", e));
            return utils::json_response(
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": "Invalid request" }),
            );
        }
    };

    if !state.verify_credentials(&form.username, &form.password) {
        logger::event(
            LogTag::Auth,
            LogLevel::Warning,
            "login_failed",
            &[("username", json!(form.username))],
        );
        return utils::json_response(
            StatusCode::UNAUTHORIZED,
            json!({ "success": false, "error": "Invalid username or password" }),
        );
    }

    let session = match state.sessions.create(&form.username) {
        Ok(session) => session,
        Err(e) => {
            logger::error(LogTag::Auth, &format!("Failed to create session: {}", e));
            return utils::json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": "Failed to create session" }),
            );
        }
    };

    logger::event(
        LogTag::Auth,
        LogLevel::Info,
        "login_success",
        &[("username", json!(form.username))],
    );

    let cookie = session_cookie(&session, state.sessions.timeout().as_secs());
    let redirect = safe_redirect_target(query.redirect.as_deref());

    (
        [(header::SET_COOKIE, cookie)],
        utils::json_response(
            StatusCode::OK,
            json!({ "success": true, "redirect": redirect }),
        ),
    )
        .into_response()
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = get_cookie(&headers, SESSION_COOKIE_NAME) {
        state.sessions.delete(&id);
        logger::debug(LogTag::Auth, "Session ended by logout");
    }

    ([(header::SET_COOKIE, cleared_cookie())], Redirect::to("/login")).into_response()
}
