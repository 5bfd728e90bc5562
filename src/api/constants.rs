//! API constants and endpoint builders for the Dynamics 365 metadata API

/// On-premise Web API version
pub const API_VERSION: &str = "v9.1";

/// Base API path for Dynamics 365
pub const API_BASE_PATH: &str = "/api/data";

/// Request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Full API path with version
pub fn api_path() -> String {
    format!("{}/{}", API_BASE_PATH, API_VERSION)
}

/// Standard headers for Dynamics 365 requests
pub mod headers {
    pub const ACCEPT_JSON: &str = "application/json";
    pub const ODATA_MAX_VERSION: &str = "4.0";
    pub const ODATA_VERSION: &str = "4.0";
}

/// Option-set attributes carrying the two-tier state/status model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSetAttribute {
    StateCode,
    StatusCode,
}

impl OptionSetAttribute {
    pub fn logical_name(self) -> &'static str {
        match self {
            OptionSetAttribute::StateCode => "statecode",
            OptionSetAttribute::StatusCode => "statuscode",
        }
    }

    /// Metadata subtype the attribute collection is cast to
    pub fn type_cast(self) -> &'static str {
        match self {
            OptionSetAttribute::StateCode => "Microsoft.Dynamics.CRM.StateAttributeMetadata",
            OptionSetAttribute::StatusCode => "Microsoft.Dynamics.CRM.StatusAttributeMetadata",
        }
    }
}

/// Percent-encode an OData query option value
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Activity entity definitions with logical name, set name and display name
pub fn activity_entities_endpoint(base_url: &str) -> String {
    format!(
        "{}{}/EntityDefinitions?$select=LogicalName,EntitySetName,DisplayName&$filter={}",
        base_url,
        api_path(),
        encode("IsActivity eq true")
    )
}

/// State or status option set of one entity
pub fn option_set_endpoint(base_url: &str, entity: &str, attribute: OptionSetAttribute) -> String {
    format!(
        "{}{}/EntityDefinitions(LogicalName='{}')/Attributes/{}?$filter={}&$select=LogicalName&$expand=OptionSet($select=Options)",
        base_url,
        api_path(),
        entity,
        attribute.type_cast(),
        encode(&format!("LogicalName eq '{}'", attribute.logical_name()))
    )
}

/// Full entity definitions for activities and the four core activity types
pub fn entity_definitions_endpoint(base_url: &str) -> String {
    let filter = [
        "IsActivity eq true",
        "LogicalName eq 'email'",
        "LogicalName eq 'phonecall'",
        "LogicalName eq 'task'",
        "LogicalName eq 'appointment'",
    ]
    .join(" or ");
    format!("{}{}/EntityDefinitions?$filter={}", base_url, api_path(), encode(&filter))
}

/// Global option set definitions ordered by name
pub fn global_option_sets_endpoint(base_url: &str) -> String {
    format!(
        "{}{}/GlobalOptionSetDefinitions?$select=Name,MetadataId,OptionSetType,Description,DisplayName,IsCustomizable,IsGlobal,IsManaged,IsCustomOptionSet,IsCustomGlobalOptionSet,Options&$orderby=Name",
        base_url,
        api_path()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_entities_endpoint() {
        assert_eq!(
            activity_entities_endpoint("http://crm"),
            "http://crm/api/data/v9.1/EntityDefinitions?$select=LogicalName,EntitySetName,DisplayName&$filter=IsActivity%20eq%20true"
        );
    }

    #[test]
    fn test_option_set_endpoint_for_statuscode() {
        let url = option_set_endpoint("http://crm", "task", OptionSetAttribute::StatusCode);
        assert_eq!(
            url,
            "http://crm/api/data/v9.1/EntityDefinitions(LogicalName='task')/Attributes/Microsoft.Dynamics.CRM.StatusAttributeMetadata?$filter=LogicalName%20eq%20%27statuscode%27&$select=LogicalName&$expand=OptionSet($select=Options)"
        );
    }

    #[test]
    fn test_entity_definitions_filter_names_core_activities() {
        let url = entity_definitions_endpoint("http://crm");
        assert!(url.starts_with("http://crm/api/data/v9.1/EntityDefinitions?$filter="));
        let decoded = urlencoding::decode(&url).unwrap();
        assert!(decoded.contains("IsActivity eq true or LogicalName eq 'email'"));
        assert!(decoded.ends_with("LogicalName eq 'appointment'"));
    }
}
