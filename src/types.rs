use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Pending,
    Analyzed,
}

/// One alert from the upstream signal source.
///
/// `analyzed_by`, `analyzed_at` and `response_time_seconds` are `None` while
/// the signal is pending and are set together by the analyze transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub ticker: String,
    pub action: SignalAction,
    pub price: f64,
    pub event_timestamp: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub status: SignalStatus,
    pub analyzed_by: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub response_time_seconds: Option<f64>,
}

impl Signal {
    pub fn is_pending(&self) -> bool {
        self.status == SignalStatus::Pending
    }
}

/// Raw ingestion payload. Every field is kept as an untyped JSON value so a
/// malformed field falls back to its default instead of rejecting the body.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignalPayload {
    #[serde(default)]
    pub ticker: Value,
    #[serde(default)]
    pub action: Value,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub auth_token: Value,
}

impl SignalPayload {
    /// Take each known key out of a JSON object on its own, so one bad field
    /// cannot discard the others. A non-object yields an empty payload.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        Self {
            ticker: fields.remove("ticker").unwrap_or_default(),
            action: fields.remove("action").unwrap_or_default(),
            price: fields.remove("price").unwrap_or_default(),
            timestamp: fields.remove("timestamp").unwrap_or_default(),
            auth_token: fields.remove("auth_token").unwrap_or_default(),
        }
    }

    /// Token carried inside the payload, if it is a string.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_str()
    }
}

/// Result of a successful analyze transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyzeOutcome {
    pub signal: Signal,
    pub response_time_seconds: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Win,
    Loss,
    #[default]
    Pending,
}

/// A manually entered execution record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    /// Weak reference by id only; the signal may not exist.
    pub signal_id: Option<Uuid>,
    pub direction: TradeDirection,
    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub result: TradeResult,
    pub pips: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trade submission before the server assigns id and timestamps.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTrade {
    #[serde(default)]
    pub signal_id: Option<Uuid>,
    pub direction: TradeDirection,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub result: TradeResult,
    #[serde(default)]
    pub pips: Option<f64>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewTrade {
    pub fn new(direction: TradeDirection) -> Self {
        Self {
            signal_id: None,
            direction,
            entry_price: None,
            exit_price: None,
            stop_loss: None,
            take_profit: None,
            result: TradeResult::default(),
            pips: None,
            created_by: None,
        }
    }
}

/// One analyst's row on the leaderboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub analyst: String,
    pub total_signals: usize,
    pub total_response_time: f64,
    pub fastest_response: f64,
    pub slowest_response: f64,
    pub average_response_time: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub signals: usize,
    pub pending_signals: usize,
    pub trades: usize,
    pub uptime_seconds: f64,
    pub timestamp: DateTime<Utc>,
}
