//! Signal Desk - trading-alert intake and analyst response-time leaderboard
//!
//! Signals arrive from an upstream alert source, analysts claim them, and the
//! time from arrival to analysis feeds a per-analyst leaderboard. Trades can be
//! recorded against signals for bookkeeping.

pub mod api;
pub mod clock;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use api::{router, run_server, AppState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use data::store::SignalStore;
pub use data::trades::TradeStore;
pub use error::{ApiError, ConfigError, SignalError};
pub use services::leaderboard::build_leaderboard;
pub use services::lifecycle::SignalLifecycle;
pub use types::{
    AnalyzeOutcome, LeaderboardEntry, NewTrade, Signal, SignalAction, SignalPayload, SignalStatus,
    Trade, TradeDirection, TradeResult,
};
