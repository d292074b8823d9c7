//! Tools command.

use mapgate_core::config::Config;
use std::path::Path;

/// Print the tool catalog as JSON.
pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load_effective(config_path)?;
    let catalog = super::build_catalog(&config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "tools": catalog.definitions() }))?
    );
    Ok(())
}
