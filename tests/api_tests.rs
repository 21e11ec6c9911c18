mod common;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{build_test_app, build_test_app_with, send, send_with_token};
use trade_journal::config::AppConfig;

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}

fn eth_short() -> Value {
    json!({
        "total_assets": "447000",
        "current_price": "2667",
        "direction": "short",
        "stop_loss_price": "2700",
        "take_profit_price": "2500",
        "win_ratio": "0.6",
    })
}

fn long_plan(symbol: &str) -> Value {
    json!({
        "symbol": symbol,
        "total_assets": "10000",
        "current_price": "100",
        "direction": "long",
        "stop_loss_price": "95",
        "take_profit_price": "110",
        "win_ratio": "0.5",
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = build_test_app();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store"], "memory");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = build_test_app();
    let (status, _) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_evaluate_short_setup() {
    let app = build_test_app();
    let (status, json) = send(&app, "POST", "/api/evaluate", Some(eth_short())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert_eq!(data["is_valid"], true);
    assert_eq!(
        data["logs"],
        json!([
            "Income: 0.0626",
            "Loss: 0.0124",
            "ROI: 0.0326",
            "Max Leverage: 1.62",
            "Max Position Size: 722,514.55",
            "Must SL Price (Short): 2,700.00",
            "Must TP Price (Short): 2,172.00",
            "Kelly Factor: 52.10%",
            "Kelly-Adjusted Position Size: 376,399.79",
        ])
    );
}

#[tokio::test]
async fn test_evaluate_degenerate_stop_is_bad_request() {
    let app = build_test_app();
    let mut body = eth_short();
    body["stop_loss_price"] = json!("2667");

    let (status, json) = send(&app, "POST", "/api/evaluate", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("stop-loss"));
}

#[tokio::test]
async fn test_evaluate_with_request_profile_override() {
    let app = build_test_app();
    let mut body = long_plan("ETHUSDT");
    body["risk_profile"] = json!({ "max_loss_pct": "0.01", "must_tp_pct": "0.30" });

    let (status, json) = send(&app, "POST", "/api/evaluate", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["data"]["max_leverage"]), dec!(0.2));
    assert_eq!(decimal(&json["data"]["recommended_size"]), dec!(500));
}

#[tokio::test]
async fn test_accepted_plans_get_sequential_trade_ids() {
    let app = build_test_app();

    let (status, first) = send(&app, "POST", "/api/plans", Some(long_plan("ethusdt"))).await;
    assert_eq!(status, StatusCode::OK);
    let record = &first["data"]["record"];
    assert_eq!(record["trade_id"], 1);
    assert_eq!(record["symbol"], "ETHUSDT");
    assert_eq!(record["execution"]["status"], "ongoing");
    assert_eq!(decimal(&record["execution"]["position_size"]), dec!(1000));
    assert_eq!(decimal(&record["execution"]["enter_price"]), dec!(100));
    assert_eq!(decimal(&record["execution"]["exit_price"]), dec!(110));
    assert_eq!(decimal(&record["plan"]["max_loss_pct"]), dec!(0.02));
    assert_eq!(first["data"]["evaluation"]["is_valid"], true);

    let (_, second) = send(&app, "POST", "/api/plans", Some(long_plan("BTCUSDT"))).await;
    assert_eq!(second["data"]["record"]["trade_id"], 2);
}

#[tokio::test]
async fn test_rejected_plan_is_not_recorded() {
    let app = build_test_app();
    let mut body = eth_short();
    body["win_ratio"] = json!("0.1");
    body["symbol"] = json!("ETHUSDT");

    let (status, json) = send(&app, "POST", "/api/plans", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("Not a good trade"));

    let (_, counts) = send(&app, "GET", "/api/trades/count", None).await;
    assert_eq!(counts["data"]["total"], 0);
}

#[tokio::test]
async fn test_zero_edge_plan_is_recorded_with_zero_size() {
    let app = build_test_app();
    let mut body = long_plan("ETHUSDT");
    body["take_profit_price"] = json!("105");

    let (status, json) = send(&app, "POST", "/api/plans", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    let evaluation = &json["data"]["evaluation"];
    assert_eq!(evaluation["is_valid"], true);
    assert_eq!(decimal(&evaluation["recommended_size"]), Decimal::ZERO);

    let record = &json["data"]["record"];
    assert_eq!(record["trade_id"], 1);
    assert_eq!(decimal(&record["plan"]["position_size"]), Decimal::ZERO);
    assert_eq!(decimal(&record["execution"]["position_size"]), Decimal::ZERO);

    let (_, counts) = send(&app, "GET", "/api/trades/count", None).await;
    assert_eq!(counts["data"]["total"], 1);
}

#[tokio::test]
async fn test_trade_id_and_status_filters_are_exclusive() {
    let app = build_test_app();
    send(&app, "POST", "/api/plans", Some(long_plan("ETHUSDT"))).await;

    let (status, json) = send(&app, "GET", "/api/trades?status=ongoing&trade_id=1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, json) = send(&app, "GET", "/api/trades?trade_id=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_plan_with_invalid_symbol_is_bad_request() {
    let app = build_test_app();
    let (status, _) = send(&app, "POST", "/api/plans", Some(long_plan("ETH/USDT"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_execution_lifecycle() {
    let app = build_test_app();
    let (_, created) = send(&app, "POST", "/api/plans", Some(long_plan("ETHUSDT"))).await;
    let id = created["data"]["record"]["id"].as_str().unwrap().to_string();

    // Close the trade
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/trades/{id}/execution"),
        Some(json!({ "status": "win", "exit_price": "108", "pnl": "80" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["execution"]["status"], "win");
    assert_eq!(decimal(&updated["data"]["execution"]["exit_price"]), dec!(108));
    assert_eq!(decimal(&updated["data"]["execution"]["enter_price"]), dec!(100));

    // Empty patch
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/trades/{id}/execution"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Status filter
    let (_, wins) = send(&app, "GET", "/api/trades?status=win", None).await;
    assert_eq!(wins["data"].as_array().unwrap().len(), 1);
    let (_, ongoing) = send(&app, "GET", "/api/trades?status=ongoing", None).await;
    assert!(ongoing["data"].as_array().unwrap().is_empty());
    let (status, _) = send(&app, "GET", "/api/trades?status=pending", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Summary reflects the closed trade
    let (_, summary) = send(&app, "GET", "/api/analytics/summary", None).await;
    assert_eq!(summary["data"]["wins"], 1);
    assert_eq!(decimal(&summary["data"]["total_pnl"]), dec!(80));
    assert_eq!(decimal(&summary["data"]["win_rate"]), dec!(1));
}

#[tokio::test]
async fn test_review_template_then_save() {
    let app = build_test_app();
    let (_, created) = send(&app, "POST", "/api/plans", Some(long_plan("ETHUSDT"))).await;
    let id = created["data"]["record"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/trades/{id}/review");

    let (status, review) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["data"]["is_template"], true);
    assert!(review["data"]["review"].as_str().unwrap().contains("## Lessons"));

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "review": "Entered early, respected the stop." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, review) = send(&app, "GET", &uri, None).await;
    assert_eq!(review["data"]["is_template"], false);
    assert_eq!(review["data"]["review"], "Entered early, respected the stop.");
}

#[tokio::test]
async fn test_added_execution_shares_trade_id() {
    let app = build_test_app();
    let (_, created) = send(&app, "POST", "/api/plans", Some(long_plan("ETHUSDT"))).await;
    let id = created["data"]["record"]["id"].as_str().unwrap().to_string();

    let (status, added) = send(
        &app,
        "POST",
        &format!("/api/trades/{id}/executions"),
        Some(json!({ "position_size": "400" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["data"]["trade_id"], 1);
    assert!(added["data"]["plan"].is_null());
    assert_eq!(decimal(&added["data"]["execution"]["position_size"]), dec!(400));
    assert_ne!(added["data"]["id"], created["data"]["record"]["id"]);

    let (_, same_trade) = send(&app, "GET", "/api/trades?trade_id=1", None).await;
    let records = same_trade["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], created["data"]["record"]["id"]);

    let (_, counts) = send(&app, "GET", "/api/trades/count", None).await;
    assert_eq!(counts["data"]["total"], 2);
    assert_eq!(counts["data"]["distinct_trades"], 1);
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let app = build_test_app();
    let (_, created) = send(&app, "POST", "/api/plans", Some(long_plan("ETHUSDT"))).await;
    let id = created["data"]["record"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/trades/{id}");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_runtime_config_changes_evaluation() {
    let app = build_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/api/config",
        Some(json!({ "entries": { "max_loss_pct": "0.01", "unknown_key": "1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["key"], "max_loss_pct");
    assert_eq!(json["data"][0]["value"], "0.01");

    let (_, json) = send(&app, "POST", "/api/evaluate", Some(long_plan("ETHUSDT"))).await;
    assert_eq!(decimal(&json["data"]["recommended_size"]), dec!(500));

    let (status, _) = send(
        &app,
        "PUT",
        "/api/config",
        Some(json!({ "entries": { "must_tp_pct": "1.5" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/config",
        Some(json!({ "entries": { "unknown_key": "1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bearer_token_required_when_configured() {
    let app = build_test_app_with(AppConfig {
        api_token: Some("secret".into()),
        ..AppConfig::default()
    });

    let (status, json) = send(&app, "GET", "/api/trades", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);

    let (status, _) = send_with_token(&app, "GET", "/api/trades", None, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_with_token(&app, "GET", "/api/trades", None, Some("secret")).await;
    assert_eq!(status, StatusCode::OK);

    // Public routes stay open
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_price_lookup_fetches_once_then_caches() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/ticker/price")
        .match_query(mockito::Matcher::UrlEncoded(
            "symbol".into(),
            "ETHUSDT".into(),
        ))
        .with_status(200)
        .with_body(r#"{"symbol":"ETHUSDT","price":"2667.41000000"}"#)
        .expect(1)
        .create_async()
        .await;

    let app = build_test_app_with(AppConfig {
        price_feed_url: server.url(),
        ..AppConfig::default()
    });

    let (status, json) = send(&app, "GET", "/api/prices/ethusdt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["data"]["price"]), dec!(2667.41));

    let (status, _) = send(&app, "GET", "/api/prices/ETHUSDT", None).await;
    assert_eq!(status, StatusCode::OK);
    mock.assert_async().await;

    let (_, all) = send(&app, "GET", "/api/prices", None).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_price_feed_outage_is_bad_gateway() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v3/ticker/price")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let app = build_test_app_with(AppConfig {
        price_feed_url: server.url(),
        ..AppConfig::default()
    });

    let (status, json) = send(&app, "GET", "/api/prices/BTCUSDT", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["success"], false);
}
