//! Configuration commands

use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{config::default_config_path, ForecastConfig};

/// Load the forecast config, attaching the path to any error
pub fn load_config(path: Option<&Path>) -> Result<ForecastConfig> {
    ForecastConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to load forecast config".to_string(),
    })
}

pub fn cmd_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;

    match (path, default_config_path()) {
        (Some(p), _) if p.exists() => println!("# Source: {}", p.display()),
        (None, Some(p)) if p.exists() => println!("# Source: {}", p.display()),
        _ => println!("# Source: built-in defaults"),
    }
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
