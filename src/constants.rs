//! Application-wide constants and sentinel values
//!
//! Every default the ingestion and trade paths fall back to lives here so the
//! lenient-parsing policy can be read in one place.

/// Fallbacks applied when an inbound field is missing or malformed
pub mod defaults {
    /// Ticker used when the upstream payload carries none
    pub const UNKNOWN_TICKER: &str = "UNKNOWN";

    /// Identity used when an analyst or trade author is not named
    pub const ANONYMOUS: &str = "Anonymous";

    /// Price used when the payload price is absent or not a finite number
    pub const PRICE: f64 = 0.0;

    /// Pips recorded on a trade when none are submitted
    pub const PIPS: f64 = 0.0;

    /// Epoch numbers at or above this magnitude are read as milliseconds
    pub const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;
}

/// HTTP server constants
pub mod server {
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
}

/// Credential handling at the ingestion boundary
pub mod auth {
    /// Header checked when the payload has no `auth_token`
    pub const TOKEN_HEADER: &str = "x-auth-token";
}

/// Environment variables that override `config.yaml`
pub mod env {
    pub const CONFIG_PATH: &str = "SIGNAL_DESK_CONFIG";
    pub const HOST: &str = "SIGNAL_DESK_HOST";
    pub const PORT: &str = "SIGNAL_DESK_PORT";
    pub const WEBHOOK_SECRET: &str = "WEBHOOK_SECRET";
}

/// Logging event names for structured logging
pub mod events {
    pub const SIGNAL_INGESTED: &str = "signal_ingested";
    pub const SIGNAL_ANALYZED: &str = "signal_analyzed";
    pub const SIGNAL_REJECTED: &str = "signal_rejected";
    pub const FIELD_DEFAULTED: &str = "field_defaulted";
    pub const TRADE_RECORDED: &str = "trade_recorded";
}
