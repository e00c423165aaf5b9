/// Price table partials
///
/// Every response carries `X-Price-Freshness` so the dashboard (and curl)
/// can tell live prices from stale or reference values.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::logger::{self, LogTag};
use crate::pricing::{find_coin, CoinEntry, Freshness, PriceSnapshot};
use crate::webserver::{state::AppState, templates, utils};

pub const FRESHNESS_HEADER: &str = "x-price-freshness";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ticker", get(ticker_table))
        .route("/ticker/:id", get(ticker_row))
        .route("/search", get(search))
}

fn with_freshness(freshness: Freshness, html: String) -> Response {
    ([(FRESHNESS_HEADER, freshness.as_str())], Html(html)).into_response()
}

fn render_table(state: &AppState, snapshot: PriceSnapshot) -> Response {
    let rows: Vec<(CoinEntry, Vec<u64>)> = snapshot
        .coins
        .into_iter()
        .map(|coin| (coin, state.scheduler.delay_queue()))
        .collect();

    with_freshness(
        snapshot.freshness,
        templates::ticker_table(&rows, snapshot.freshness),
    )
}

/// Full price table
async fn ticker_table(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.prices.snapshot().await;
    render_table(&state, snapshot)
}

/// Single row, swapped in place by each row's refresh timer
async fn ticker_row(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let snapshot = state.prices.snapshot().await;

    match find_coin(&snapshot.coins, &id) {
        Ok(coin) => with_freshness(
            snapshot.freshness,
            templates::ticker_row(&coin, &state.scheduler.delay_queue()),
        ),
        Err(e) => {
            logger::debug(LogTag::Webserver, &format!("Ticker row lookup failed: {}", e));
            utils::text_response(StatusCode::NOT_FOUND, "Coin not found")
        }
    }
}

/// Table filtered by `?search=`; an empty query returns every coin
async fn search(State(state): State<Arc<AppState>>, Query(query): Query<SearchQuery>) -> Response {
    let q = query.search.unwrap_or_default();
    let snapshot = state.prices.search_snapshot(&q).await;
    render_table(&state, snapshot)
}
