use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use log::info;
use std::path::PathBuf;

use crate::files;
use crate::xml::{self, DEFAULT_JSON_OUTPUT, DEFAULT_XML_INPUT};

#[derive(Args)]
pub struct XmlToJsonCommands {
    /// XML document to convert
    #[arg(long, default_value = DEFAULT_XML_INPUT)]
    pub input: PathBuf,

    /// JSON file to write
    #[arg(long, default_value = DEFAULT_JSON_OUTPUT)]
    pub output: PathBuf,
}

pub fn handle_xml_to_json_command(args: XmlToJsonCommands) -> Result<()> {
    info!("Converting {} to JSON", args.input.display());

    let xml_text = files::read_to_string(&args.input)?;
    let json = xml::xml_to_json(&xml_text)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;
    files::write_json(&args.output, &json)?;

    println!(
        "Metadata converted to JSON and saved to {}",
        args.output.display().to_string().bright_green()
    );
    Ok(())
}
