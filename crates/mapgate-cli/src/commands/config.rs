//! Configuration management commands.

use clap::Args;
use mapgate_core::config::Config;
use mapgate_core::paths;
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (default)
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: String,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => {
            let config = Config::load_effective(config_path)?;
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Get { key } => {
            let config = Config::load_effective(config_path)?;
            match lookup(&config, &key)? {
                Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
                None => anyhow::bail!("Key not found: {}", key),
            }
        }

        ConfigCommand::Path => match config_path {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", paths::config_file()?.display()),
        },

        ConfigCommand::Validate => {
            Config::load_effective(config_path)?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Resolve a dot-separated key against the serialized configuration.
fn lookup(config: &Config, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let json = serde_json::to_value(config)?;
    let value = key
        .split('.')
        .try_fold(&json, |acc, k| acc.get(k))
        .cloned();
    Ok(value)
}
