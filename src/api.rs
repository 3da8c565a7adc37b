use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::constants::{auth, events};
use crate::data::store::SignalStore;
use crate::data::trades::TradeStore;
use crate::error::ApiError;
use crate::services::leaderboard::build_leaderboard;
use crate::services::lifecycle::SignalLifecycle;
use crate::services::normalize;
use crate::types::{HealthReport, LeaderboardEntry, NewTrade, Signal, SignalPayload, Trade};

pub struct AppState {
    pub lifecycle: SignalLifecycle,
    pub trades: TradeStore,
    pub clock: Arc<dyn Clock>,
    pub config: AppConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            lifecycle: SignalLifecycle::new(SignalStore::new(), clock.clone()),
            trades: TradeStore::new(),
            clock,
            config,
            started_at: Instant::now(),
        }
    }

    fn signals(&self) -> &SignalStore {
        self.lifecycle.store()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(ingest_signal))
        .route("/api/signals", get(list_signals))
        .route("/api/signals/pending", get(list_pending_signals))
        .route("/api/signals/{id}", get(get_signal))
        .route("/api/signals/{id}/analyze", post(analyze_signal))
        .route("/api/trades", get(list_trades).post(create_trade))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API Server listening on {}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping API server");
}

async fn ingest_signal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => SignalPayload::from_json(value),
        Err(e) => {
            warn!(
                event = events::FIELD_DEFAULTED,
                "Webhook body is not JSON ({}), using defaults",
                e
            );
            SignalPayload::default()
        }
    };

    let header_token = headers
        .get(auth::TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    let token = normalize::credential(payload.auth_token())
        .or_else(|| normalize::credential(header_token));

    if let (Some(token), Some(secret)) = (token, state.config.webhook_secret()) {
        // Plain equality, not constant-time.
        if token != secret {
            warn!(event = events::SIGNAL_REJECTED, "🚫 [SIGNALS] Webhook token mismatch");
            return Err(ApiError::Unauthorized("invalid token".to_string()));
        }
    }

    let signal = state.lifecycle.ingest(&payload, token)?;
    Ok(Json(json!({
        "success": true,
        "signal_id": signal.id,
        "signal": signal,
    })))
}

async fn list_signals(State(state): State<Arc<AppState>>) -> Json<Vec<Signal>> {
    Json(state.signals().list_all())
}

async fn list_pending_signals(State(state): State<Arc<AppState>>) -> Json<Vec<Signal>> {
    Json(state.signals().list_pending())
}

fn parse_signal_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("signal not found: {}", raw)))
}

async fn get_signal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Signal>, ApiError> {
    let id = parse_signal_id(&id)?;
    state
        .signals()
        .find_by_id(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("signal not found: {}", id)))
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeRequest {
    #[serde(default, alias = "analyzed_by")]
    analyst: Option<String>,
}

async fn analyze_signal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = parse_signal_id(&id)?;
    let request: AnalyzeRequest = serde_json::from_slice(&body).unwrap_or_default();

    let outcome = state.lifecycle.analyze(&id, request.analyst.as_deref())?;
    Ok(Json(json!({
        "success": true,
        "signal": outcome.signal,
        "response_time": outcome.response_time_seconds,
    })))
}

#[derive(Debug, Deserialize)]
struct TradeQuery {
    signal_id: Option<Uuid>,
}

async fn list_trades(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Json<Vec<Trade>> {
    match query.signal_id {
        Some(signal_id) => Json(state.trades.list_for_signal(&signal_id)),
        None => Json(state.trades.list_all()),
    }
}

async fn create_trade(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Trade>), ApiError> {
    let new_trade: NewTrade = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid trade: {}", e)))?;
    let trade = state.trades.insert(new_trade, state.clock.now());
    Ok((StatusCode::CREATED, Json(trade)))
}

async fn get_leaderboard(State(state): State<Arc<AppState>>) -> Json<Vec<LeaderboardEntry>> {
    let snapshot = state.signals().list_all();
    let rows = build_leaderboard(&snapshot);
    debug!("Leaderboard rebuilt: {} analysts from {} signals", rows.len(), snapshot.len());
    Json(rows)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let (signals, pending_signals) = state.signals().counts();
    Json(HealthReport {
        status: "ok".to_string(),
        signals,
        pending_signals,
        trades: state.trades.len(),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        timestamp: state.clock.now(),
    })
}
