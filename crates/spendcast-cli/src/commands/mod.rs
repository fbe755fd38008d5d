//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Configuration loading and display
//! - `forecast` - One-shot forecasts (predict, sample)
//! - `serve` - Web server command

pub mod config;
pub mod forecast;
pub mod serve;

// Re-export command functions for main.rs
pub use config::*;
pub use forecast::*;
pub use serve::*;
