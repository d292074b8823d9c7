//! Serve command.

use clap::Args;
use mapgate_core::config::{BindMode, Config};
use mapgate_gateway::Gateway;
use std::path::Path;
use tracing::{info, warn};

/// Serve command arguments.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind mode (loopback, lan)
    #[arg(short, long)]
    pub bind: Option<BindMode>,

    /// Port number
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.gateway.bind = bind;
        }
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
    }
}

/// Run the serve command.
pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = Config::load_effective(config_path)?;
    args.apply(&mut config);
    config.validate()?;

    if config.gateway.bind != BindMode::Loopback {
        warn!(
            "Gateway binds to all interfaces on port {}; any client that can reach it can open sessions",
            config.gateway.port
        );
    }
    if mapgate_core::env::default_api_key().is_none() {
        info!("NS_API_KEY not set; tools need a bearer credential on each session");
    }

    // Duplicate tool names fail here, before anything is bound.
    let catalog = super::build_catalog(&config)?;
    info!("Registered {} tools", catalog.len());

    let gateway = Gateway::new(config, catalog);
    gateway.run().await?;
    Ok(())
}
