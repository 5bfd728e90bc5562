pub mod dumps;
pub mod entity_sets;
pub mod generate;
pub mod status_map;
pub mod xml_to_json;

pub use dumps::{
    EntityDefinitionsCommands, GlobalOptionSetsCommands, handle_entity_definitions_command,
    handle_global_option_sets_command,
};
pub use entity_sets::{EntitySetsCommands, handle_entity_sets_command, run_entity_sets};
pub use generate::{
    DisplayNamesCommands, EntitySetJsCommands, handle_display_names_command,
    handle_entity_set_js_command,
};
pub use status_map::{StatusMapCommands, handle_status_map_command, run_status_map};
pub use xml_to_json::{XmlToJsonCommands, handle_xml_to_json_command};

use anyhow::{Context, Result};
use colored::*;

use crate::api::MetadataClient;
use crate::config::ConnectionConfig;
use crate::ui::prompts::TerminalPrompter;

/// Resolve connection settings and build the metadata client
pub(crate) fn connect() -> Result<MetadataClient> {
    let config = ConnectionConfig::resolve(&TerminalPrompter)
        .context("Failed to resolve CRM connection settings")?;
    println!("Connecting to {}", config.base_url.cyan());
    MetadataClient::new(&config).context("Failed to build HTTP client")
}
