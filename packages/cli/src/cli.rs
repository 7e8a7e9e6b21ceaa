// ABOUTME: Command line arguments for the clientwatch binary
// ABOUTME: Flags override the values read from the environment

use clap::{Parser, Subcommand};
use clientwatch_config::Config;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clientwatch")]
#[command(about = "Watch a Wi-Fi router for new clients and send notifications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the poller and HTTP server until interrupted
    Serve {
        #[arg(long, help = "HTTP port (overrides CLIENTWATCH_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Database file (overrides CLIENTWATCH_DATABASE)")]
        database: Option<PathBuf>,
    },
    /// Read or change stored preferences
    Prefs {
        #[arg(long, global = true, help = "Database file (overrides CLIENTWATCH_DATABASE)")]
        database: Option<PathBuf>,
        #[command(subcommand)]
        command: PrefsCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommands {
    /// List all preferences, secure values masked
    List,
    /// Print the plaintext value of one preference
    Get { name: String },
    /// Set a preference
    Set {
        name: String,
        value: String,
        #[arg(long, help = "Store the value encrypted")]
        secure: bool,
    },
}

impl Commands {
    /// Environment configuration with this command's flags applied
    pub fn apply_overrides(&self, config: Config) -> Config {
        match self {
            Commands::Serve { port, database } => config
                .with_port(*port)
                .with_database_path(database.clone()),
            Commands::Prefs { database, .. } => config.with_database_path(database.clone()),
        }
    }
}
