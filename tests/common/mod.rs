//! In-process fake of the market-data API for integration tests

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Coin id answered with 404
pub const MISSING: &str = "missing-coin";
/// Coin id answered with a malformed body
pub const MALFORMED: &str = "bad-coin";

#[derive(Clone)]
struct ApiState {
    coins: usize,
    history_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    hits: Arc<AtomicUsize>,
}

/// Handle of a running fake server
pub struct FakeApi {
    pub base_url: String,
    history_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    hits: Arc<AtomicUsize>,
}

impl FakeApi {
    /// Query parameters of every history request so far
    pub fn history_queries(&self) -> Vec<HashMap<String, String>> {
        self.history_queries.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve the fake API on an ephemeral port; the listing has `coins` entries
pub async fn spawn(coins: usize) -> FakeApi {
    let state = ApiState {
        coins,
        history_queries: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let history_queries = state.history_queries.clone();
    let hits = state.hits.clone();

    let app = Router::new()
        .route("/v1/cryptocurrency/listing", get(listing))
        .route("/v1/cryptocurrency/:id", get(info))
        .route("/v1/cryptocurrency/:id/quotes", get(tickers))
        .route("/v1/cryptocurrency/:id/ohlcv/historical", get(history))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeApi {
        base_url: format!("http://{}", addr),
        history_queries,
        hits,
    }
}

fn failure(id: &str) -> Option<Response> {
    match id {
        MISSING => Some((StatusCode::NOT_FOUND, r#"{"error":"id not found"}"#).into_response()),
        MALFORMED => Some((StatusCode::OK, "{not json").into_response()),
        _ => None,
    }
}

fn name_of(id: &str) -> String {
    match id {
        "btc-bitcoin" => "Bitcoin".to_string(),
        other => other.to_string(),
    }
}

async fn listing(State(state): State<ApiState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let coins: Vec<Value> = (1..=state.coins)
        .map(|i| {
            json!({
                "id": format!("c{}-coin", i),
                "name": format!("Coin {}", i),
                "symbol": format!("C{}", i),
                "rank": i,
                "is_new": false,
                "is_active": true,
                "type": "coin"
            })
        })
        .collect();
    Json(Value::Array(coins))
}

async fn info(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = failure(&id) {
        return response;
    }
    Json(json!({
        "id": id,
        "name": name_of(&id),
        "symbol": "BTC",
        "rank": "1",
        "is_new": false,
        "is_active": true,
        "type": "coin",
        "description": "Peer-to-peer electronic cash.",
        "open_source": true,
        "started_at": "2009-01-03T00:00:00Z"
    }))
    .into_response()
}

async fn tickers(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(response) = failure(&id) {
        return response;
    }
    Json(json!({
        "id": id,
        "name": name_of(&id),
        "symbol": "BTC",
        "rank": 1,
        "total_supply": 19500000,
        "max_supply": 21000000,
        "quotes": {
            "USD": {
                "price": 1234.5678,
                "percent_change_15m": 0.01,
                "percent_change_30m": 0.02,
                "percent_change_1h": -0.1,
                "percent_change_6h": 0.5,
                "percent_change_12h": 1.25,
                "percent_change_24h": 2.0,
                "percent_change_7d": -4.5,
                "percent_change_30d": 10.75,
                "percent_change_1y": 120.3,
                "ath_price": 73750.07,
                "ath_date": "2024-03-14T07:10:36Z"
            }
        }
    }))
    .into_response()
}

async fn history(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.history_queries.lock().unwrap().push(query);
    if let Some(response) = failure(&id) {
        return response;
    }
    let points: Vec<Value> = (0..14i64)
        .map(|i| {
            let close = 1_700_086_399 + i * 86_400;
            json!({
                "time_open": close - 86_399,
                "time_close": close,
                // Some deployments send prices as strings.
                "open": format!("{}", 99 + i),
                "high": 110 + i,
                "low": 90 + i,
                "close": 100 + i,
                "volume": "1000",
                "market_cap": 0
            })
        })
        .collect();
    Json(Value::Array(points)).into_response()
}
