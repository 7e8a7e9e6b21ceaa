// ABOUTME: Entry point for the clientwatch binary
// ABOUTME: Installs logging, loads configuration and dispatches subcommands

use clap::Parser;
use clientwatch_cli::commands::{prefs, serve};
use clientwatch_cli::{Cli, Commands};
use clientwatch_config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = cli.command.apply_overrides(Config::load()?);

    match &cli.command {
        Commands::Serve { .. } => serve::run(config).await,
        Commands::Prefs { command, .. } => prefs::run(command, &config).await,
    }
}
