use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use trade_journal::api::router::create_router;
use trade_journal::api::ws_types::WsMessage;
use trade_journal::config::AppConfig;
use trade_journal::db::MemoryTradeStore;
use trade_journal::price_feed::{PriceCache, PriceFeedClient};
use trade_journal::AppState;

/// App state over an empty in-memory store. The Prometheus recorder is built
/// but not installed, so any number of tests can share one process.
#[allow(dead_code)]
pub fn test_state(config: AppConfig) -> AppState {
    let (ws_tx, _) = tokio::sync::broadcast::channel::<WsMessage>(16);
    let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

    AppState {
        store: Arc::new(MemoryTradeStore::new()),
        price_feed: PriceFeedClient::new(config.price_feed_url.clone()),
        prices: PriceCache::new(),
        config,
        ws_tx,
        metrics_handle,
    }
}

#[allow(dead_code)]
pub fn build_test_app() -> axum::Router {
    create_router(test_state(AppConfig::default()))
}

#[allow(dead_code)]
pub fn build_test_app_with(config: AppConfig) -> axum::Router {
    create_router(test_state(config))
}

/// Send one request and decode the JSON body (`Null` for non-JSON bodies).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    send_with_token(app, method, uri, body, None).await
}

#[allow(dead_code)]
pub async fn send_with_token(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Connect to the test database and run all migrations. Returns `None` when
/// `TEST_DATABASE_URL` is unset so database tests can be skipped.
#[allow(dead_code)]
pub async fn try_setup_test_db() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Clean tables for test isolation
    sqlx::query("DELETE FROM trade_history").execute(&pool).await.ok();
    sqlx::query("DELETE FROM runtime_config").execute(&pool).await.ok();

    Some(pool)
}
