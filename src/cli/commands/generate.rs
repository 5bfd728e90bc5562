use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::{Path, PathBuf};

use crate::codegen::{self, DEFAULT_DISPLAY_NAME_FILE, DEFAULT_ENTITY_SET_FILE, LookupField};
use crate::files;
use crate::metadata::entity_sets::{self, DEFAULT_ENTITY_SETS_FILE};

#[derive(Args)]
pub struct DisplayNamesCommands {
    /// Entity-set JSON file to read
    #[arg(long, default_value = DEFAULT_ENTITY_SETS_FILE)]
    pub input: PathBuf,

    /// JavaScript module to write
    #[arg(long, default_value = DEFAULT_DISPLAY_NAME_FILE)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct EntitySetJsCommands {
    /// Entity-set JSON file to read
    #[arg(long, default_value = DEFAULT_ENTITY_SETS_FILE)]
    pub input: PathBuf,

    /// JavaScript module to write
    #[arg(long, default_value = DEFAULT_ENTITY_SET_FILE)]
    pub output: PathBuf,
}

pub fn handle_display_names_command(args: DisplayNamesCommands) -> Result<()> {
    generate(&args.input, &args.output, LookupField::Label)
}

pub fn handle_entity_set_js_command(args: EntitySetJsCommands) -> Result<()> {
    generate(&args.input, &args.output, LookupField::Set)
}

/// Generate a lookup module from the entity-set file and echo it
pub fn generate(input: &Path, output: &Path, field: LookupField) -> Result<()> {
    let entries = entity_sets::read_entity_sets(input)
        .with_context(|| format!("Failed to read entity sets from {}", input.display()))?;
    let module = codegen::lookup_module(&entries, field, &input.display().to_string())
        .with_context(|| format!("Failed to generate {}", field.identifier()))?;
    files::write_text(output, &module)?;

    print!("{}", module);
    println!(
        "Saved → {}  (copy the object into resources.js)",
        output.display().to_string().bright_green()
    );
    Ok(())
}
