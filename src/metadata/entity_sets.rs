//! Activity entity sets keyed by logical name.

use indexmap::IndexMap;
use log::{debug, info};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::labels::select_label;
use super::models::EntityDefinition;
use crate::api::MetadataClient;
use crate::error::{Result, ToolError};
use crate::files;

/// Default location of the entity-set file shared by the downstream tools
pub const DEFAULT_ENTITY_SETS_FILE: &str = "activity_sets.json";

/// Serialized entry of the entity-set file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    pub set: String,
    pub label: String,
    #[serde(rename = "MetadataId")]
    pub metadata_id: String,
}

/// Entry as read back from the entity-set file; projections check the field
/// they need
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntitySetEntry {
    pub set: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "MetadataId")]
    pub metadata_id: Option<String>,
}

/// Logical name → descriptor, in API response order
pub type EntitySets = IndexMap<String, EntityDescriptor>;

/// Logical name → entry, in file order
pub type EntitySetFile = IndexMap<String, EntitySetEntry>;

/// Reduce one entity definition to its logical name and descriptor
pub fn describe_entity(definition: &EntityDefinition) -> Result<(String, EntityDescriptor)> {
    let logical_name = definition
        .logical_name
        .clone()
        .ok_or_else(|| ToolError::validation("LogicalName", "entity definition"))?;
    let context = || format!("entity definition '{}'", logical_name);

    let set = definition
        .entity_set_name
        .clone()
        .ok_or_else(|| ToolError::validation("EntitySetName", context()))?;
    let metadata_id = definition
        .metadata_id
        .clone()
        .ok_or_else(|| ToolError::validation("MetadataId", context()))?;

    let labels = definition
        .display_name
        .as_ref()
        .map(|d| d.localized_labels.as_slice())
        .unwrap_or_default();
    let label = select_label(labels)
        .ok_or_else(|| ToolError::EmptyLabels(logical_name.clone()))?
        .to_string();

    Ok((
        logical_name,
        EntityDescriptor {
            set,
            label,
            metadata_id,
        },
    ))
}

pub fn build_entity_sets(definitions: &[EntityDefinition]) -> Result<EntitySets> {
    let mut sets = EntitySets::with_capacity(definitions.len());
    for definition in definitions {
        let (logical_name, descriptor) = describe_entity(definition)?;
        debug!("{} -> {} ({})", logical_name, descriptor.set, descriptor.label);
        sets.insert(logical_name, descriptor);
    }
    Ok(sets)
}

pub async fn fetch_entity_sets(client: &MetadataClient) -> Result<EntitySets> {
    let definitions = client.fetch_activity_entities().await?;
    info!("Received {} activity entity definitions", definitions.len());
    build_entity_sets(&definitions)
}

pub fn read_entity_sets(path: &Path) -> Result<EntitySetFile> {
    files::read_json(path)
}

/// Logical names of the entity-set file, in file order; entry contents are not
/// looked at
pub fn read_entity_names(path: &Path) -> Result<Vec<String>> {
    let entries: IndexMap<String, IgnoredAny> = files::read_json(path)?;
    Ok(entries.into_keys().collect())
}
