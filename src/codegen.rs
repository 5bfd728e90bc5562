//! JavaScript lookup-table modules.
//!
//! Every module has the same shape: a header comment, one `const` object
//! literal with an entry per activity, and a default export. Keys and string
//! values are emitted as JSON string literals, which are valid JavaScript.

use serde_json::Value;

use crate::error::{Result, ToolError};
use crate::metadata::{EntitySetFile, StatusMap};

pub const DISPLAY_NAME_IDENTIFIER: &str = "activityTypeToDisplayName";
pub const ENTITY_SET_IDENTIFIER: &str = "activityTypeToEntitySet";
pub const STATUS_MAP_IDENTIFIER: &str = "activityStatusMap";

pub const DEFAULT_DISPLAY_NAME_FILE: &str = "activityTypeToDisplayName.js";
pub const DEFAULT_ENTITY_SET_FILE: &str = "activityTypeToEntitySet.js";

/// Field of an entity-set entry projected into a flat lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    /// Display label → `activityTypeToDisplayName`
    Label,
    /// Entity set name → `activityTypeToEntitySet`
    Set,
}

impl LookupField {
    pub fn key(self) -> &'static str {
        match self {
            LookupField::Label => "label",
            LookupField::Set => "set",
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            LookupField::Label => DISPLAY_NAME_IDENTIFIER,
            LookupField::Set => ENTITY_SET_IDENTIFIER,
        }
    }
}

/// JavaScript (and JSON) string literal.
///
/// Line and paragraph separators are escaped as well, since pre-ES2019
/// parsers reject them inside string literals.
pub fn js_string(value: &str) -> String {
    escape_separators(Value::String(value.to_string()).to_string())
}

fn escape_separators(json: String) -> String {
    json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029")
}

/// Render `const <identifier> = {...}; export default <identifier>;`
///
/// `entries` values must already be JavaScript expressions.
pub fn render_module<I, K>(identifier: &str, generated_from: &str, entries: I) -> String
where
    I: IntoIterator<Item = (K, String)>,
    K: AsRef<str>,
{
    let mut out = format!("// Auto-generated from {}\n", generated_from);
    out.push_str(&format!("const {} = {{\n", identifier));
    for (key, value) in entries {
        out.push_str(&format!("  {}: {},\n", js_string(key.as_ref()), value));
    }
    out.push_str("};\n");
    out.push_str(&format!("export default {};\n", identifier));
    out
}

/// Flat `logicalName → field` lookup module
pub fn lookup_module(entries: &EntitySetFile, field: LookupField, generated_from: &str) -> Result<String> {
    let projected = entries
        .iter()
        .map(|(logical_name, entry)| {
            let value = match field {
                LookupField::Label => entry.label.as_deref(),
                LookupField::Set => entry.set.as_deref(),
            };
            value
                .map(|v| (logical_name.as_str(), js_string(v)))
                .ok_or_else(|| ToolError::validation(field.key(), format!("entry '{}'", logical_name)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(render_module(field.identifier(), generated_from, projected))
}

/// Nested status map module; entity order follows the map
pub fn status_map_module(map: &StatusMap, generated_from: &str) -> Result<String> {
    let entries = map
        .iter()
        .map(|(entity, states)| {
            serde_json::to_string(states)
                .map(|json| (entity.as_str(), escape_separators(json)))
                .map_err(|e| ToolError::parse("status map", e))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(render_module(STATUS_MAP_IDENTIFIER, generated_from, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntitySetEntry, StateStatusMap};
    use indexmap::IndexMap;

    fn entry(set: Option<&str>, label: Option<&str>) -> EntitySetEntry {
        EntitySetEntry {
            set: set.map(str::to_string),
            label: label.map(str::to_string),
            metadata_id: Some("id".to_string()),
        }
    }

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("it's \"x\""), r#""it's \"x\"""#);
        assert_eq!(js_string("وظیفه"), "\"وظیفه\"");
    }

    #[test]
    fn test_js_string_escapes_line_separators() {
        let literal = js_string("a\u{2028}b\u{2029}c");
        assert_eq!(literal, r#""a\u2028b\u2029c""#);
        assert_eq!(serde_json::from_str::<String>(&literal).unwrap(), "a\u{2028}b\u{2029}c");
    }

    #[test]
    fn test_status_map_module_escapes_line_separators() {
        let mut states = StateStatusMap::new();
        states.insert(0, IndexMap::from([(1, "Open\u{2028}now".to_string())]));
        let mut map = StatusMap::new();
        map.insert("task".to_string(), states);

        let js = status_map_module(&map, "activity_status_map.json").unwrap();

        assert!(!js.contains('\u{2028}'));
        assert!(js.contains(r#"{"0":{"1":"Open\u2028now"}}"#));
    }

    #[test]
    fn test_display_name_module() {
        let mut entries = EntitySetFile::new();
        entries.insert("task".to_string(), entry(Some("tasks"), Some("وظیفه")));
        entries.insert("email".to_string(), entry(Some("emails"), Some("Email")));

        let js = lookup_module(&entries, LookupField::Label, "activity_sets.json").unwrap();

        assert_eq!(
            js,
            "// Auto-generated from activity_sets.json\n\
             const activityTypeToDisplayName = {\n  \"task\": \"وظیفه\",\n  \"email\": \"Email\",\n};\n\
             export default activityTypeToDisplayName;\n"
        );
    }

    #[test]
    fn test_entity_set_module_requires_field() {
        let mut entries = EntitySetFile::new();
        entries.insert("fax".to_string(), entry(None, Some("Fax")));

        let err = lookup_module(&entries, LookupField::Set, "activity_sets.json").unwrap_err();
        assert!(matches!(err, ToolError::Validation { ref field, .. } if field == "set"));
        assert!(lookup_module(&entries, LookupField::Label, "activity_sets.json").is_ok());
    }

    #[test]
    fn test_status_map_module() {
        let mut states = StateStatusMap::new();
        states.insert(1, IndexMap::from([(2, "Open".to_string())]));
        states.insert(0, IndexMap::from([(1, "Active".to_string())]));
        let mut map = StatusMap::new();
        map.insert("task".to_string(), states);

        let js = status_map_module(&map, "activity_status_map.json").unwrap();

        assert!(js.contains("const activityStatusMap = {\n"));
        assert!(js.contains("  \"task\": {\"1\":{\"2\":\"Open\"},\"0\":{\"1\":\"Active\"}},\n"));
        assert!(js.ends_with("};\nexport default activityStatusMap;\n"));
    }

    #[test]
    fn test_empty_module() {
        let js = render_module::<Vec<(&str, String)>, &str>("x", "nothing", Vec::new());
        assert_eq!(js, "// Auto-generated from nothing\nconst x = {\n};\nexport default x;\n");
    }
}
