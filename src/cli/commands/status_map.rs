use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use log::info;
use std::path::PathBuf;

use crate::api::MetadataClient;
use crate::codegen;
use crate::files;
use crate::metadata::entity_sets::{self, DEFAULT_ENTITY_SETS_FILE};
use crate::metadata::status_map::{self, DEFAULT_STATUS_MAP_JS, DEFAULT_STATUS_MAP_JSON, StatusMapReport};

#[derive(Args)]
pub struct StatusMapCommands {
    /// Entity-set JSON file listing the entities to process
    #[arg(long, default_value = DEFAULT_ENTITY_SETS_FILE)]
    pub input: PathBuf,

    /// Status map JSON file to write
    #[arg(long, default_value = DEFAULT_STATUS_MAP_JSON)]
    pub json_output: PathBuf,

    /// Status map JavaScript module to write
    #[arg(long, default_value = DEFAULT_STATUS_MAP_JS)]
    pub js_output: PathBuf,
}

pub async fn handle_status_map_command(args: StatusMapCommands) -> Result<()> {
    let client = super::connect()?;
    let report = run_status_map(&client, &args).await?;

    println!(
        "Saved → {}  (entities: {})",
        args.json_output.display().to_string().bright_green(),
        report.map.len()
    );
    println!(
        "Saved → {}  (copy into resources.js)",
        args.js_output.display().to_string().bright_green()
    );
    println!(
        "Processed {}, skipped {}",
        report.processed.len().to_string().green(),
        report.skipped.len().to_string().yellow()
    );
    if !report.skipped.is_empty() {
        println!("Skipped: {}", report.skipped.join(", ").dimmed());
    }
    Ok(())
}

/// Fetch the status map and write the JSON file and its JavaScript mirror.
///
/// Both files are written together once every entity was fetched; a failure
/// anywhere leaves neither behind.
pub async fn run_status_map(client: &MetadataClient, args: &StatusMapCommands) -> Result<StatusMapReport> {
    let entities = entity_sets::read_entity_names(&args.input)
        .with_context(|| format!("Failed to read entity sets from {}", args.input.display()))?;
    info!("Loaded {} entities from {}", entities.len(), args.input.display());

    let report = status_map::fetch_status_map(client, entities.iter().map(String::as_str))
        .await
        .context("Failed to fetch status metadata")?;

    let mut json = files::to_pretty_json(&report.map)?;
    json.push('\n');
    let module = codegen::status_map_module(&report.map, &args.json_output.display().to_string())?;
    files::write_all(&[
        (args.json_output.as_path(), json.as_str()),
        (args.js_output.as_path(), module.as_str()),
    ])
    .context("Failed to write status map")?;

    Ok(report)
}
