//! Spendcast CLI - ML budget forecasting
//!
//! Usage:
//!   spendcast serve --port 5001       Start web server
//!   spendcast predict --file req.json Forecast from a request file
//!   spendcast sample                  Forecast the built-in sample
//!   spendcast config                  Show effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { port, host } => commands::cmd_serve(config_path, &host, port).await,
        Commands::Predict { file, today } => commands::cmd_predict(config_path, &file, today),
        Commands::Sample { today } => commands::cmd_sample(config_path, today),
        Commands::Config => commands::cmd_config(config_path),
    }
}
