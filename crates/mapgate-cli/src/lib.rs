//! mapgate command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mapgate - Google Maps tools over the Model Context Protocol
#[derive(Parser)]
#[command(name = "mapgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "MAPGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Serve(commands::serve::ServeArgs),

    /// Print the tool catalog as JSON
    Tools,

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "mapgate=info,tower_http=warn",
        1 => "mapgate=debug,tower_http=debug",
        _ => "mapgate=trace,tower_http=trace",
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, config_path).await,
        Commands::Tools => commands::tools::run(config_path),
        Commands::Config(args) => commands::config::run(args, config_path),
        Commands::Version => {
            println!("mapgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
