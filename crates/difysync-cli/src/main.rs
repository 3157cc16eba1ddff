//! difysync CLI - Mirror a local folder into Dify knowledge bases
//!
//! Provides commands for:
//! - Watching a folder and syncing on change, on a timer and on SIGHUP
//! - Running a single reconciliation pass
//! - Showing and validating configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, sync::SyncCommand, watch::WatchCommand, ConfigOverrides};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "difysync",
    version,
    about = "Synchronize a local folder tree into Dify knowledge bases"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Keep the folder in sync until interrupted
    Watch(WatchCommand),
    /// Run one reconciliation pass and print its summary
    Sync(SyncCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Picks the log filter directive: `-v` beats the configured level
fn filter_directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = cli.overrides.resolve()?;

    // RUST_LOG wins over flags and config
    let directive = filter_directive(cli.verbose, &loaded.config.logging.level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Watch(cmd) => cmd.execute(loaded, format).await,
        Commands::Sync(cmd) => cmd.execute(loaded, format).await,
        Commands::Config(cmd) => cmd.execute(loaded, format).await,
    }
}
