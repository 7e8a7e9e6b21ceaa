// ABOUTME: The `prefs` command
// ABOUTME: Reads and writes preferences directly in the database without polling

use anyhow::{bail, Context};
use clientwatch_config::Config;
use clientwatch_preferences::{PreferenceStore, PreferenceView};
use clientwatch_security::SecureValueCodec;
use clientwatch_storage::Database;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use std::sync::Arc;

use crate::cli::PrefsCommands;

pub async fn run(command: &PrefsCommands, config: &Config) -> anyhow::Result<()> {
    let database = Database::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let store = PreferenceStore::open(
        SecureValueCodec::new(&config.passphrase),
        Arc::new(database.preferences()),
    )
    .await
    .context("Failed to load preferences")?;

    let result = execute(command, &store).await;
    database.close().await;
    result
}

/// Run a prefs subcommand against an open store
pub async fn execute(command: &PrefsCommands, store: &PreferenceStore) -> anyhow::Result<()> {
    match command {
        PrefsCommands::List => {
            let views = store.list_masked();
            if views.is_empty() {
                println!("{}", "No preferences stored yet".yellow());
                println!("{}", "They are seeded the first time 'clientwatch serve' runs".dimmed());
                return Ok(());
            }
            println!("{}", render_table(&views));
        }
        PrefsCommands::Get { name } => match store.get(name)? {
            Some(value) => println!("{}", value),
            None => bail!("Preference '{}' is not set", name),
        },
        PrefsCommands::Set {
            name,
            value,
            secure,
        } => {
            store.set(name, value, *secure).await?;
            let kind = if *secure { "secure " } else { "" };
            println!("{} Stored {}preference '{}'", "✓".green().bold(), kind, name);
        }
    }
    Ok(())
}

pub fn render_table(views: &[PreferenceView]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Name", "Value", "Secure"]);
    for view in views {
        table.add_row(vec![
            view.name.clone(),
            view.value.clone(),
            if view.secure { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}
