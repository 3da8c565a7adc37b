use signal_desk::{run_server, AppConfig, AppState, SystemClock};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if dotenvy::dotenv().is_ok() {
        info!("Loaded .env");
    }

    info!("Starting Signal Desk...");

    // Load Configuration
    let config = AppConfig::load()?;
    info!("Server: {}", config.bind_addr());
    if config.webhook_secret().is_none() {
        warn!("⚠️ No webhook secret configured - any non-empty token will be accepted");
    }

    let app_state = Arc::new(AppState::new(config, Arc::new(SystemClock)));

    // Start API Server
    info!("Initializing API Server...");
    run_server(app_state).await?;

    info!("Signal Desk stopped");
    Ok(())
}
