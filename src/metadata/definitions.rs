//! Raw metadata dumps: activity entity definitions and global option sets.

use serde::Serialize;
use serde_json::Value;

use super::models::{GlobalOptionSetSummary, ODataCollection};
use crate::error::{Result, ToolError};

pub const DEFAULT_ENTITY_DEFINITIONS_FILE: &str = "src/resources/EntityDefinitions.json";
pub const DEFAULT_GLOBAL_OPTION_SETS_FILE: &str = "src/core/examples/globalOptionSets.json";

/// Counts reported after a global option set dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptionSetStats {
    pub total: usize,
    pub custom: usize,
    pub global: usize,
    pub managed: usize,
}

pub fn option_set_stats(response: &Value) -> Result<OptionSetStats> {
    let collection: ODataCollection<GlobalOptionSetSummary> = serde_json::from_value(response.clone())
        .map_err(|e| ToolError::parse("GlobalOptionSetDefinitions response", e))?;
    let sets = collection
        .value
        .ok_or_else(|| ToolError::validation("value", "GlobalOptionSetDefinitions response"))?;

    let count = |flag: fn(&GlobalOptionSetSummary) -> Option<bool>| {
        sets.iter().filter(|set| flag(set).unwrap_or(false)).count()
    };

    Ok(OptionSetStats {
        total: sets.len(),
        custom: count(|s| s.is_custom_option_set),
        global: count(|s| s.is_global),
        managed: count(|s| s.is_managed),
    })
}

/// Number of records in an OData payload, if it has a `value` array
pub fn record_count(response: &Value) -> Option<usize> {
    response.get("value").and_then(Value::as_array).map(Vec::len)
}
