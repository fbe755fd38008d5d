//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Spendcast - Forecast monthly spending against a budget
#[derive(Parser)]
#[command(name = "spendcast")]
#[command(about = "ML budget forecasting service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Forecast config file (defaults to the per-user override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the forecasting web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5001")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Forecast from a JSON request file
    ///
    /// The file uses the same body as `POST /predict`.
    Predict {
        /// JSON request file
        #[arg(short, long)]
        file: PathBuf,

        /// Date treated as today (YYYY-MM-DD, defaults to the current date)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Forecast the built-in six-month sample
    Sample {
        /// Date treated as today (YYYY-MM-DD, defaults to the current date)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Show the effective forecast configuration
    Config,
}
