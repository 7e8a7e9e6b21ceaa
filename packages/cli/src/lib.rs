// ABOUTME: Client Watch command line interface
// ABOUTME: Argument parsing plus the serve and prefs command implementations

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, PrefsCommands};
