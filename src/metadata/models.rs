//! Wire models for the Dynamics 365 metadata API.
//!
//! Field names follow the API's PascalCase. Keys the tools cannot work without
//! are still `Option` here so a missing key surfaces as a validation error
//! naming the record instead of a generic deserialization failure.

use serde::Deserialize;

/// OData collection envelope (`{"value": [...]}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ODataCollection<T> {
    pub value: Option<Vec<T>>,
}

/// One row of `EntityDefinitions`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityDefinition {
    /// Required
    pub logical_name: Option<String>,
    /// Required
    pub entity_set_name: Option<String>,
    /// Optional; absent behaves like a label set with no labels
    pub display_name: Option<Label>,
    /// Required; always returned for entity definitions even when not selected
    pub metadata_id: Option<String>,
}

/// Localizable label (`DisplayName`, option `Label`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    #[serde(default)]
    pub localized_labels: Vec<LocalizedLabel>,
    pub user_localized_label: Option<LocalizedLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocalizedLabel {
    pub label: String,
    pub language_code: i32,
}

impl LocalizedLabel {
    pub fn new(language_code: i32, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            language_code,
        }
    }
}

/// State or status attribute with its expanded option set
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionSetAttributeMetadata {
    pub logical_name: Option<String>,
    pub option_set: Option<OptionSetMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionSetMetadata {
    #[serde(default)]
    pub options: Vec<OptionMetadata>,
}

/// One option of a state or status option set
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionMetadata {
    /// Required
    pub value: Option<i32>,
    /// Owning state of a status option; absent or null on state options
    #[serde(default)]
    pub state: Option<i32>,
    /// Required, with `UserLocalizedLabel` set
    pub label: Option<Label>,
}

/// Fields of `GlobalOptionSetDefinitions` used for run statistics
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalOptionSetSummary {
    pub name: Option<String>,
    #[serde(default)]
    pub is_custom_option_set: Option<bool>,
    #[serde(default)]
    pub is_global: Option<bool>,
    #[serde(default)]
    pub is_managed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_definition_from_api_shape() {
        let raw = json!({
            "@odata.context": "ignored",
            "LogicalName": "task",
            "EntitySetName": "tasks",
            "MetadataId": "bf94a5e0-1f5a-4f3e-9d73-000000000001",
            "DisplayName": {
                "LocalizedLabels": [
                    {"Label": "Task", "LanguageCode": 1033, "IsManaged": true}
                ],
                "UserLocalizedLabel": {"Label": "Task", "LanguageCode": 1033}
            }
        });

        let def: EntityDefinition = serde_json::from_value(raw).unwrap();

        assert_eq!(def.logical_name.as_deref(), Some("task"));
        assert_eq!(def.entity_set_name.as_deref(), Some("tasks"));
        let labels = def.display_name.unwrap().localized_labels;
        assert_eq!(labels, vec![LocalizedLabel::new(1033, "Task")]);
    }

    #[test]
    fn test_option_with_null_state() {
        let raw = json!({"Value": 1, "State": null, "Label": {"UserLocalizedLabel": {"Label": "Open", "LanguageCode": 1033}}});
        let option: OptionMetadata = serde_json::from_value(raw).unwrap();

        assert_eq!(option.value, Some(1));
        assert_eq!(option.state, None);
        assert!(option.label.unwrap().localized_labels.is_empty());
    }

    #[test]
    fn test_missing_keys_deserialize_as_none() {
        let def: EntityDefinition = serde_json::from_value(json!({})).unwrap();
        assert!(def.logical_name.is_none());
        assert!(def.display_name.is_none());

        let collection: ODataCollection<EntityDefinition> = serde_json::from_value(json!({})).unwrap();
        assert!(collection.value.is_none());
    }
}
