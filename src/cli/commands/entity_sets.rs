use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use log::info;
use std::path::PathBuf;

use crate::api::MetadataClient;
use crate::files;
use crate::metadata::EntitySets;
use crate::metadata::entity_sets::{self, DEFAULT_ENTITY_SETS_FILE};

#[derive(Args)]
pub struct EntitySetsCommands {
    /// Entity-set JSON file to write
    #[arg(long, default_value = DEFAULT_ENTITY_SETS_FILE)]
    pub output: PathBuf,
}

pub async fn handle_entity_sets_command(args: EntitySetsCommands) -> Result<()> {
    let client = super::connect()?;
    let sets = run_entity_sets(&client, &args).await?;

    println!(
        "Saved → {}  (entries: {})",
        args.output.display().to_string().bright_green(),
        sets.len()
    );
    Ok(())
}

/// Fetch the activity entity sets and write them; nothing is written on failure
pub async fn run_entity_sets(client: &MetadataClient, args: &EntitySetsCommands) -> Result<EntitySets> {
    info!("Fetching entity sets from {}", client.base_url());

    let sets = entity_sets::fetch_entity_sets(client)
        .await
        .context("Failed to fetch activity entity sets")?;
    files::write_json(&args.output, &sets)?;
    Ok(sets)
}
