use super::commands::{
    DisplayNamesCommands, EntityDefinitionsCommands, EntitySetJsCommands, EntitySetsCommands,
    GlobalOptionSetsCommands, StatusMapCommands, XmlToJsonCommands,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dynamics-activity-tools")]
#[command(about = "Extract Dynamics 365 activity metadata and generate JavaScript lookup tables")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an XML metadata document to JSON
    XmlToJson(XmlToJsonCommands),
    /// Fetch activity entities with their set names and display labels
    EntitySets(EntitySetsCommands),
    /// Fetch state/status option maps for every activity entity
    StatusMap(StatusMapCommands),
    /// Generate the activity display-name JavaScript module
    DisplayNames(DisplayNamesCommands),
    /// Generate the activity entity-set JavaScript module
    EntitySetJs(EntitySetJsCommands),
    /// Dump raw entity definitions for activity entities
    EntityDefinitions(EntityDefinitionsCommands),
    /// Dump global option set definitions with statistics
    GlobalOptionSets(GlobalOptionSetsCommands),
}

impl Commands {
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Commands::XmlToJson(args) => super::commands::handle_xml_to_json_command(args),
            Commands::EntitySets(args) => super::commands::handle_entity_sets_command(args).await,
            Commands::StatusMap(args) => super::commands::handle_status_map_command(args).await,
            Commands::DisplayNames(args) => super::commands::handle_display_names_command(args),
            Commands::EntitySetJs(args) => super::commands::handle_entity_set_js_command(args),
            Commands::EntityDefinitions(args) => {
                super::commands::handle_entity_definitions_command(args).await
            }
            Commands::GlobalOptionSets(args) => {
                super::commands::handle_global_option_sets_command(args).await
            }
        }
    }
}
