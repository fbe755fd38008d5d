//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::load_config;

/// Environment variable holding comma-separated CORS origins
const ALLOWED_ORIGINS_ENV: &str = "SPENDCAST_ALLOWED_ORIGINS";

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn cmd_serve(config_path: Option<&Path>, host: &str, port: u16) -> Result<()> {
    let forecast = load_config(config_path)?;
    let allowed_origins = parse_origins(&std::env::var(ALLOWED_ORIGINS_ENV).unwrap_or_default());
    tracing::debug!(?allowed_origins, "Loaded server configuration");

    println!("🚀 Starting Spendcast forecasting server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Seasonality: yearly={}, weekly={}",
        forecast.model.yearly_seasonality, forecast.model.weekly_seasonality
    );
    println!("   Interval width: {:.0}%", forecast.model.interval_width * 100.0);
    if allowed_origins.is_empty() {
        println!(
            "   CORS: same-origin only (set {} to allow others)",
            ALLOWED_ORIGINS_ENV
        );
    } else {
        println!("   CORS: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let config = spendcast_server::ServerConfig {
        allowed_origins,
        forecast,
    };

    spendcast_server::serve_with_config(host, port, config).await?;

    Ok(())
}
