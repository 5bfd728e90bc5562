use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::files;
use crate::metadata::definitions::{
    self, DEFAULT_ENTITY_DEFINITIONS_FILE, DEFAULT_GLOBAL_OPTION_SETS_FILE,
};

#[derive(Args)]
pub struct EntityDefinitionsCommands {
    /// JSON file to write the raw response to
    #[arg(long, default_value = DEFAULT_ENTITY_DEFINITIONS_FILE)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct GlobalOptionSetsCommands {
    /// JSON file to write the raw response to
    #[arg(long, default_value = DEFAULT_GLOBAL_OPTION_SETS_FILE)]
    pub output: PathBuf,
}

pub async fn handle_entity_definitions_command(args: EntityDefinitionsCommands) -> Result<()> {
    let client = super::connect()?;
    let response = client
        .fetch_entity_definitions()
        .await
        .context("Failed to fetch entity definitions")?;
    files::write_json(&args.output, &response)?;

    println!(
        "Metadata fetched and saved to {}",
        args.output.display().to_string().bright_green()
    );
    if let Some(count) = definitions::record_count(&response) {
        println!("Entity definitions: {}", count);
    }
    Ok(())
}

pub async fn handle_global_option_sets_command(args: GlobalOptionSetsCommands) -> Result<()> {
    let client = super::connect()?;
    let response = client
        .fetch_global_option_sets()
        .await
        .context("Failed to fetch global option set definitions")?;
    let stats = definitions::option_set_stats(&response)?;
    files::write_json(&args.output, &response)?;

    println!(
        "Successfully saved GlobalOptionSetDefinitions to {}",
        args.output.display().to_string().bright_green()
    );
    println!("Total option sets fetched: {}", stats.total);
    println!("\n{}", "Statistics:".bold());
    println!("{}", files::to_pretty_json(&stats)?);
    Ok(())
}
