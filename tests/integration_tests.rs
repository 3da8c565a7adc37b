//! Integration tests for the signal desk.
//! These tests verify that components work together correctly, both through
//! the library API and over HTTP.

use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};
use signal_desk::{
    build_leaderboard, router, AppConfig, AppState, ManualClock, SignalAction, SignalError,
    SignalLifecycle, SignalPayload, SignalStatus, SignalStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

fn engine() -> (SignalLifecycle, ManualClock) {
    let clock = ManualClock::new(start_time());
    let engine = SignalLifecycle::new(SignalStore::new(), Arc::new(clock.clone()));
    (engine, clock)
}

// Start a server on an ephemeral port
async fn spawn_test_server(secret: Option<&str>) -> (String, ManualClock) {
    let mut config = AppConfig::default();
    config.auth.webhook_secret = secret.map(str::to_string);

    let clock = ManualClock::new(start_time());
    let state = Arc::new(AppState::new(config, Arc::new(clock.clone())));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    (format!("http://{}", addr), clock)
}

/// Ingest, analyze, re-analyze, then rank
#[test]
fn test_signal_lifecycle_scenarios() {
    let (engine, clock) = engine();

    // Fully specified payload
    let payload: SignalPayload = serde_json::from_value(
        json!({"ticker": "EURUSD", "action": "buy", "price": 1.0850, "auth_token": "t"}),
    )
    .unwrap();
    let signal = engine.ingest(&payload, payload.auth_token()).unwrap();
    assert_eq!(signal.ticker, "EURUSD");
    assert_eq!(signal.action, SignalAction::Buy);
    assert_eq!(signal.price, 1.0850);
    assert_eq!(signal.status, SignalStatus::Pending);

    // Claimed 2.5s after arrival
    clock.advance(Duration::milliseconds(2500));
    let outcome = engine.analyze(&signal.id, Some("Alice")).unwrap();
    assert!((outcome.response_time_seconds - 2.5).abs() < 1e-6);
    assert_eq!(outcome.signal.status, SignalStatus::Analyzed);
    assert_eq!(outcome.signal.analyzed_by.as_deref(), Some("Alice"));

    // Second claim is rejected and changes nothing
    clock.advance(Duration::seconds(5));
    assert_eq!(
        engine.analyze(&signal.id, Some("Alice")),
        Err(SignalError::AlreadyAnalyzed { id: signal.id })
    );
    assert_eq!(engine.store().find_by_id(&signal.id).unwrap(), outcome.signal);

    // Missing ticker and action fall back
    let bare: SignalPayload = serde_json::from_value(json!({"auth_token": "t"})).unwrap();
    let defaulted = engine.ingest(&bare, bare.auth_token()).unwrap();
    assert_eq!(defaulted.ticker, "UNKNOWN");
    assert_eq!(defaulted.action, SignalAction::Buy);

    let rows = build_leaderboard(&engine.store().list_all());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].analyst, "Alice");
    assert_eq!(rows[0].total_signals, 1);
}

/// Equal averages ranked by identity
#[test]
fn test_leaderboard_tie_from_engine() {
    let (engine, clock) = engine();
    let payload = SignalPayload::default();

    for (analyst, millis) in [("Alice", 1000), ("Bob", 2000), ("Alice", 3000)] {
        let signal = engine.ingest(&payload, Some("t")).unwrap();
        clock.advance(Duration::milliseconds(millis));
        engine.analyze(&signal.id, Some(analyst)).unwrap();
    }
    // Stays pending, must not count
    engine.ingest(&payload, Some("t")).unwrap();

    let rows = build_leaderboard(&engine.store().list_all());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].analyst, "Alice");
    assert!((rows[0].average_response_time - 2.0).abs() < 1e-9);
    assert_eq!(rows[0].fastest_response, 1.0);
    assert_eq!(rows[0].slowest_response, 3.0);
    assert_eq!(rows[1].analyst, "Bob");
    assert!((rows[1].average_response_time - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_webhook_requires_credential() {
    let (base_url, _clock) = spawn_test_server(Some("secret")).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/webhook", base_url))
        .json(&json!({"ticker": "EURUSD"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "authentication required");

    let res = client
        .post(format!("{}/webhook", base_url))
        .json(&json!({"ticker": "EURUSD", "auth_token": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid token");

    let signals: Vec<Value> = client
        .get(format!("{}/api/signals", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(signals.is_empty());
}

#[tokio::test]
async fn test_full_http_workflow() {
    let (base_url, clock) = spawn_test_server(Some("secret")).await;
    let client = reqwest::Client::new();

    // Ingest via body token
    let res = client
        .post(format!("{}/webhook", base_url))
        .json(&json!({"ticker": "EURUSD", "action": "buy", "price": 1.0850, "auth_token": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    let first_id = body["signal_id"].as_str().unwrap().to_string();
    assert_eq!(body["signal"]["status"], "pending");
    assert_eq!(body["signal"]["ticker"], "EURUSD");

    // Ingest via header token, lenient body
    let res = client
        .post(format!("{}/webhook", base_url))
        .header("X-Auth-Token", "secret")
        .body("not json at all")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let second_id = body["signal_id"].as_str().unwrap().to_string();
    assert_eq!(body["signal"]["ticker"], "UNKNOWN");
    assert_eq!(body["signal"]["action"], "buy");
    assert_eq!(body["signal"]["price"], 0.0);

    // Newest first
    let signals: Vec<Value> = client
        .get(format!("{}/api/signals", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0]["id"], second_id.as_str());
    assert_eq!(signals[1]["id"], first_id.as_str());

    // Analyze
    clock.advance(Duration::milliseconds(2500));
    let res = client
        .post(format!("{}/api/signals/{}/analyze", base_url, first_id))
        .json(&json!({"analyst": "Alice"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!((body["response_time"].as_f64().unwrap() - 2.5).abs() < 1e-6);
    assert_eq!(body["signal"]["status"], "analyzed");
    assert_eq!(body["signal"]["analyzed_by"], "Alice");

    // Second analyze conflicts
    let res = client
        .post(format!("{}/api/signals/{}/analyze", base_url, first_id))
        .json(&json!({"analyst": "Bob"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Unknown and malformed ids
    let res = client
        .post(format!("{}/api/signals/{}/analyze", base_url, uuid::Uuid::now_v7()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client
        .post(format!("{}/api/signals/not-an-id/analyze", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Single lookup
    let signal: Value = client
        .get(format!("{}/api/signals/{}", base_url, first_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(signal["analyzed_by"], "Alice");

    // Pending only holds the second signal
    let pending: Vec<Value> = client
        .get(format!("{}/api/signals/pending", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], second_id.as_str());

    // Leaderboard
    let rows: Vec<Value> = client
        .get(format!("{}/api/leaderboard", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["analyst"], "Alice");
    assert_eq!(rows[0]["total_signals"], 1);

    // Trades, including a dangling signal reference
    let res = client
        .post(format!("{}/api/trades", base_url))
        .json(&json!({"signal_id": first_id, "direction": "long", "entry_price": 1.0850, "created_by": "Alice"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let trade: Value = res.json().await.unwrap();
    assert_eq!(trade["result"], "pending");
    assert_eq!(trade["pips"], 0.0);

    let res = client
        .post(format!("{}/api/trades", base_url))
        .json(&json!({"signal_id": uuid::Uuid::now_v7(), "direction": "short"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let dangling: Value = res.json().await.unwrap();
    assert_eq!(dangling["created_by"], "Anonymous");

    let trades: Vec<Value> = client
        .get(format!("{}/api/trades", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0]["id"], dangling["id"]);

    let linked: Vec<Value> = client
        .get(format!("{}/api/trades?signal_id={}", base_url, first_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0]["id"], trade["id"]);

    // Health
    let health: Value = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["signals"], 2);
    assert_eq!(health["pending_signals"], 1);
    assert_eq!(health["trades"], 2);
}

#[tokio::test]
async fn test_without_secret_any_token_is_accepted() {
    let (base_url, _clock) = spawn_test_server(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/webhook", base_url))
        .json(&json!({"ticker": "GBPUSD", "auth_token": "anything"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/webhook", base_url))
        .json(&json!({"ticker": "GBPUSD", "auth_token": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_out_of_range_price_keeps_other_fields() {
    let (base_url, _clock) = spawn_test_server(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/webhook", base_url))
        .header("Content-Type", "application/json")
        .body(r#"{"ticker":"EURUSD","action":"sell","price":1e400,"auth_token":"t"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["signal"]["ticker"], "EURUSD");
    assert_eq!(body["signal"]["action"], "sell");
    assert_eq!(body["signal"]["price"], 0.0);

    // Duplicate keys resolve to the last value instead of dropping the body
    let res = client
        .post(format!("{}/webhook", base_url))
        .body(r#"{"ticker":"AAA","ticker":"BBB","auth_token":"t"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["signal"]["ticker"], "BBB");
}

#[tokio::test]
async fn test_invalid_trade_returns_json_error() {
    let (base_url, _clock) = spawn_test_server(None).await;
    let client = reqwest::Client::new();

    for body in [r#"{"direction":"sideways"}"#, r#"{"pips": 3}"#, "not json"] {
        let res = client
            .post(format!("{}/api/trades", base_url))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let error: Value = res.json().await.unwrap();
        assert_eq!(error["success"], false);
        assert!(error["error"].as_str().unwrap().starts_with("invalid trade"));
    }

    let trades: Vec<Value> = client
        .get(format!("{}/api/trades", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(trades.is_empty());
}
