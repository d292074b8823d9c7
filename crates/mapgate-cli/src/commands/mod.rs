//! CLI command implementations.

pub mod config;
pub mod serve;
pub mod tools;

use mapgate_core::config::Config;
use mapgate_gateway::ToolCatalog;
use mapgate_tools::{maps_tools, MapsClient};
use std::sync::Arc;
use std::time::Duration;

/// Build the Maps tool catalog for a configuration.
pub fn build_catalog(config: &Config) -> anyhow::Result<ToolCatalog> {
    let client = MapsClient::new(
        config.maps.api_base.clone(),
        Duration::from_secs(config.maps.request_timeout_secs),
    )?;
    Ok(ToolCatalog::new(maps_tools(Arc::new(client)))?)
}
