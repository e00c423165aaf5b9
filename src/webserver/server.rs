/// Axum webserver implementation
///
/// Main server lifecycle management including startup, shutdown, and graceful termination
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;

use crate::{
    errors::{CoinOpsError, CoinOpsResult},
    logger::{self, LogTag},
    webserver::{middleware as mw, routes, state::AppState},
};

/// Global shutdown notifier
static SHUTDOWN_NOTIFY: once_cell::sync::Lazy<Arc<Notify>> =
    once_cell::sync::Lazy::new(|| Arc::new(Notify::new()));

/// Start the webserver
///
/// Blocks until Ctrl-C or `shutdown()`.
pub async fn start_server(state: Arc<AppState>) -> CoinOpsResult<()> {
    let addr_str = state.config.listen_addr();
    let addr: SocketAddr = addr_str
        .parse()
        .map_err(|e| CoinOpsError::Server(format!("Invalid bind address {}: {}", addr_str, e)))?;

    let app = build_app(state.clone());

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        // Provide helpful error message for common cases
        let message = match e.kind() {
            std::io::ErrorKind::AddrInUse => format!(
                "Failed to bind to {}: Address already in use\n\
                 \n\
                 Another process is listening on port {}.\n\
                 Stop it or choose another port with --port or COINOPS_SERVER_PORT.",
                addr,
                addr.port()
            ),
            std::io::ErrorKind::PermissionDenied => format!(
                "Failed to bind to {}: Permission denied\n\
                 \n\
                 Port {} requires elevated privileges on this system.\n\
                 Consider using a port above 1024 or running with appropriate permissions.",
                addr,
                addr.port()
            ),
            _ => format!("Failed to bind to {}: {}", addr, e),
        };
        CoinOpsError::Server(message)
    })?;

    logger::info(
        LogTag::Webserver,
        &format!("Dashboard listening on http://{}", addr),
    );

    let shutdown_signal = async {
        tokio::select! {
            _ = SHUTDOWN_NOTIFY.notified() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        logger::info(
            LogTag::Webserver,
            "Received shutdown signal, stopping webserver...",
        );
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
    .map_err(|e| CoinOpsError::Server(format!("Server error: {}", e)))?;

    state.sessions.close();
    logger::info(LogTag::Webserver, "Webserver stopped gracefully");

    Ok(())
}

/// Trigger webserver shutdown
pub fn shutdown() {
    logger::debug(LogTag::Webserver, "Triggering webserver shutdown...");
    SHUTDOWN_NOTIFY.notify_one();
}

/// Build the Axum application with all routes and middleware
///
/// Layers are added innermost first, so requests pass through them in
/// reverse: request id, logging, panic recovery, allowlist, session auth.
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state.clone())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mw::session_auth,
        ))
        .layer(middleware::from_fn_with_state(state, mw::ip_allowlist))
        .layer(CatchPanicLayer::custom(mw::panic_response))
        .layer(middleware::from_fn(mw::request_logging))
        .layer(middleware::from_fn(mw::request_id))
        .layer(CompressionLayer::new())
}
