//! Two-level `{state: {status: label}}` maps per activity entity.

use indexmap::IndexMap;
use log::{info, warn};

use super::models::OptionMetadata;
use crate::api::MetadataClient;
use crate::api::constants::OptionSetAttribute;
use crate::error::{Result, ToolError};

pub const DEFAULT_STATUS_MAP_JSON: &str = "activity_status_map.json";
pub const DEFAULT_STATUS_MAP_JS: &str = "activity_status_map.js";

/// State bucket for status options without an owning state
pub const NULL_STATE_BUCKET: i32 = 0;

/// Option reduced to what the lookup table needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub state: Option<i32>,
    pub value: i32,
    pub label: String,
}

impl OptionDescriptor {
    pub fn new(state: Option<i32>, value: i32, label: impl Into<String>) -> Self {
        Self {
            state,
            value,
            label: label.into(),
        }
    }
}

/// state value → status value → label
pub type StateStatusMap = IndexMap<i32, IndexMap<i32, String>>;

/// logical name → state/status map
pub type StatusMap = IndexMap<String, StateStatusMap>;

/// Reduce raw options, taking each label from `Label.UserLocalizedLabel`
pub fn reduce_options(entity: &str, options: &[OptionMetadata]) -> Result<Vec<OptionDescriptor>> {
    options
        .iter()
        .map(|option| {
            let context = || format!("option of '{}'", entity);
            let value = option
                .value
                .ok_or_else(|| ToolError::validation("Value", context()))?;
            let label = option
                .label
                .as_ref()
                .and_then(|l| l.user_localized_label.as_ref())
                .map(|l| l.label.clone())
                .ok_or_else(|| {
                    ToolError::validation(
                        "Label.UserLocalizedLabel",
                        format!("option {} of '{}'", value, entity),
                    )
                })?;
            Ok(OptionDescriptor::new(option.state, value, label))
        })
        .collect()
}

/// Nest status options under their states.
///
/// Every state gets a bucket, in state order, even without statuses. A status
/// whose `State` is null lands in bucket 0; buckets for states not listed in
/// `states` are created on first use.
pub fn nest_options(entity: &str, states: &[OptionDescriptor], statuses: &[OptionDescriptor]) -> StateStatusMap {
    let mut map: StateStatusMap = states
        .iter()
        .map(|state| (state.value, IndexMap::new()))
        .collect();

    let real_null_bucket = map.contains_key(&NULL_STATE_BUCKET);
    let mut collision_logged = false;

    for status in statuses {
        let state = status.state.unwrap_or(NULL_STATE_BUCKET);
        // TODO: decide how a null-state status should be told apart from a real state 0
        if status.state.is_none() && real_null_bucket && !collision_logged {
            warn!(
                "{}: status without state shares bucket {} with a real state",
                entity, NULL_STATE_BUCKET
            );
            collision_logged = true;
        }
        map.entry(state)
            .or_default()
            .insert(status.value, status.label.clone());
    }
    map
}

/// Build one entity's map, or `None` when either option set is empty
pub fn build_entity_map(
    entity: &str,
    state_options: &[OptionMetadata],
    status_options: &[OptionMetadata],
) -> Result<Option<StateStatusMap>> {
    if state_options.is_empty() || status_options.is_empty() {
        return Ok(None);
    }
    let states = reduce_options(entity, state_options)?;
    let statuses = reduce_options(entity, status_options)?;
    Ok(Some(nest_options(entity, &states, &statuses)))
}

/// Result of one status-map run
#[derive(Debug, Default)]
pub struct StatusMapReport {
    pub map: StatusMap,
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
}

impl StatusMapReport {
    pub fn record(&mut self, entity: &str, outcome: Option<StateStatusMap>) {
        match outcome {
            Some(states) => {
                let status_count: usize = states.values().map(|s| s.len()).sum();
                info!(
                    "Processed {:<20} states={} status={}",
                    entity,
                    states.len(),
                    status_count
                );
                self.map.insert(entity.to_string(), states);
                self.processed.push(entity.to_string());
            }
            None => {
                warn!("Skipping {:<20} missing metadata", entity);
                self.skipped.push(entity.to_string());
            }
        }
    }
}

/// Fetch state and status options for each entity, one after another
pub async fn fetch_status_map<'a, I>(client: &MetadataClient, entities: I) -> Result<StatusMapReport>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = StatusMapReport::default();
    for entity in entities {
        let states = client.fetch_options(entity, OptionSetAttribute::StateCode).await?;
        let statuses = client.fetch_options(entity, OptionSetAttribute::StatusCode).await?;
        let outcome = build_entity_map(entity, &states, &statuses)?;
        report.record(entity, outcome);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: serde_json::Value) -> Vec<OptionMetadata> {
        serde_json::from_value(value).unwrap()
    }

    fn option(state: Option<i32>, value: i32, label: &str) -> serde_json::Value {
        json!({
            "State": state,
            "Value": value,
            "Label": {
                "LocalizedLabels": [{"Label": label, "LanguageCode": 1033}],
                "UserLocalizedLabel": {"Label": label, "LanguageCode": 1033}
            }
        })
    }

    #[test]
    fn test_null_state_goes_to_bucket_zero() {
        let states = vec![OptionDescriptor::new(None, 1, "Active")];
        let statuses = vec![
            OptionDescriptor::new(Some(1), 2, "Open"),
            OptionDescriptor::new(None, 1, "Active"),
        ];

        let map = nest_options("task", &states, &statuses);

        let expected: StateStatusMap = [
            (1, [(2, "Open".to_string())].into_iter().collect()),
            (0, [(1, "Active".to_string())].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        assert_eq!(map, expected);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn test_null_state_merges_into_real_state_zero() {
        let states = vec![
            OptionDescriptor::new(None, 0, "Open"),
            OptionDescriptor::new(None, 1, "Completed"),
        ];
        let statuses = vec![
            OptionDescriptor::new(Some(0), 2, "Not Started"),
            OptionDescriptor::new(None, 3, "Orphan"),
            OptionDescriptor::new(Some(1), 5, "Completed"),
        ];

        let map = nest_options("task", &states, &statuses);

        assert_eq!(map[&0].len(), 2);
        assert_eq!(map[&0][&3], "Orphan");
        assert_eq!(map[&1][&5], "Completed");
    }

    #[test]
    fn test_states_without_statuses_keep_empty_bucket() {
        let states = vec![
            OptionDescriptor::new(None, 0, "Open"),
            OptionDescriptor::new(None, 2, "Canceled"),
        ];
        let statuses = vec![OptionDescriptor::new(Some(0), 1, "Draft")];

        let map = nest_options("letter", &states, &statuses);

        assert!(map[&2].is_empty());
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_unknown_state_bucket_is_created() {
        let states = vec![OptionDescriptor::new(None, 0, "Open")];
        let statuses = vec![OptionDescriptor::new(Some(7), 70, "Odd")];

        let map = nest_options("fax", &states, &statuses);

        assert_eq!(map[&7][&70], "Odd");
    }

    #[test]
    fn test_build_entity_map_skips_empty_option_sets() {
        let states = options(json!([option(None, 0, "Open")]));
        assert!(build_entity_map("fax", &states, &[]).unwrap().is_none());
        assert!(build_entity_map("fax", &[], &states).unwrap().is_none());
    }

    #[test]
    fn test_build_entity_map_from_raw_options() {
        let states = options(json!([option(None, 0, "Open"), option(None, 1, "Completed")]));
        let statuses = options(json!([
            option(Some(0), 1, "Open"),
            option(Some(1), 5, "Completed")
        ]));

        let map = build_entity_map("task", &states, &statuses).unwrap().unwrap();

        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            json!({"0": {"1": "Open"}, "1": {"5": "Completed"}})
        );
    }

    #[test]
    fn test_reduce_options_requires_user_localized_label() {
        let raw = options(json!([{"Value": 1, "Label": {"LocalizedLabels": []}}]));

        let err = reduce_options("task", &raw).unwrap_err();
        assert!(matches!(err, ToolError::Validation { ref field, .. } if field == "Label.UserLocalizedLabel"));
    }

    #[test]
    fn test_reduce_options_keeps_state() {
        let raw = options(json!([option(Some(1), 2, "Open")]));
        assert_eq!(
            reduce_options("task", &raw).unwrap(),
            vec![OptionDescriptor::new(Some(1), 2, "Open")]
        );
    }

    #[test]
    fn test_report_records_skips() {
        let mut report = StatusMapReport::default();
        report.record("task", Some(StateStatusMap::new()));
        report.record("fax", None);

        assert_eq!(report.processed, vec!["task"]);
        assert_eq!(report.skipped, vec!["fax"]);
        assert!(report.map.contains_key("task"));
        assert!(!report.map.contains_key("fax"));
    }
}
