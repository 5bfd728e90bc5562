use log::{debug, info};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::constants::{self, OptionSetAttribute, headers};
use super::ntlm::{self, NtlmCredentials};
use crate::config::ConnectionConfig;
use crate::error::{Result, ToolError};
use crate::metadata::models::{
    EntityDefinition, ODataCollection, OptionMetadata, OptionSetAttributeMetadata,
};

/// NTLM-authenticated client for the Dynamics 365 metadata API
pub struct MetadataClient {
    base_url: String,
    http_client: reqwest::Client,
    credentials: NtlmCredentials,
}

impl MetadataClient {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        // One idle connection per host keeps both NTLM legs on the same socket.
        // Certificate checks are off for self-signed on-premise servers.
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(1)
            .timeout(Duration::from_secs(constants::REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("dynamics-activity-tools/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ToolError::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http_client,
            credentials: NtlmCredentials {
                domain: config.domain.clone(),
                username: config.username.clone(),
                password: config.password.clone(),
                workstation: String::new(),
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, url: &str, authorization: String) -> Result<reqwest::Response> {
        self.http_client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, headers::ACCEPT_JSON)
            .header("OData-MaxVersion", headers::ODATA_MAX_VERSION)
            .header("OData-Version", headers::ODATA_VERSION)
            .send()
            .await
            .map_err(|source| ToolError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// GET with the NTLM negotiate/challenge/authenticate exchange.
    ///
    /// Servers that answer the negotiate leg directly (no `401`) are accepted
    /// as-is. The final response is returned whatever its status.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self.send(url, ntlm::negotiate_header()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            debug!("Response status: {}", response.status());
            return Ok(response);
        }

        let challenge = ntlm::challenge_from_headers(
            response
                .headers()
                .get_all(WWW_AUTHENTICATE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
        )?;
        // drain the body so the connection goes back to the pool
        let _ = response.bytes().await;

        let authorization = ntlm::authenticate_header(&self.credentials, &challenge)?;
        let response = self.send(url, authorization).await?;
        debug!("Response status: {}", response.status());
        Ok(response)
    }

    /// GET and deserialize a JSON body; any non-2xx status is an error
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).await?;
        let response = ensure_success(url, response).await?;
        read_json_body(url, response).await
    }

    /// Activity entity definitions
    pub async fn fetch_activity_entities(&self) -> Result<Vec<EntityDefinition>> {
        let url = constants::activity_entities_endpoint(&self.base_url);
        info!("Fetching activity entity definitions");
        let collection: ODataCollection<EntityDefinition> = self.get_json(&url).await?;
        collection
            .value
            .ok_or_else(|| ToolError::validation("value", "EntityDefinitions response"))
    }

    /// Options of an entity's state or status attribute.
    ///
    /// A `404`, an empty result or an attribute without `OptionSet` all yield
    /// an empty list.
    pub async fn fetch_options(
        &self,
        entity: &str,
        attribute: OptionSetAttribute,
    ) -> Result<Vec<OptionMetadata>> {
        let url = constants::option_set_endpoint(&self.base_url, entity, attribute);
        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No {} metadata for '{}'", attribute.logical_name(), entity);
            return Ok(Vec::new());
        }
        let response = ensure_success(&url, response).await?;
        let collection: ODataCollection<OptionSetAttributeMetadata> =
            read_json_body(&url, response).await?;

        Ok(collection
            .value
            .and_then(|attributes| attributes.into_iter().next())
            .and_then(|attribute| attribute.option_set)
            .map(|option_set| option_set.options)
            .unwrap_or_default())
    }

    /// Raw `EntityDefinitions` payload for activities and core activity types
    pub async fn fetch_entity_definitions(&self) -> Result<Value> {
        let url = constants::entity_definitions_endpoint(&self.base_url);
        info!("Fetching entity definitions");
        let response = ensure_success(&url, self.get(&url).await?).await?;
        let body = response.text().await.map_err(|source| ToolError::Transport {
            url: url.clone(),
            source,
        })?;
        if body.trim().is_empty() {
            return Err(ToolError::parse(
                format!("response from {}", url),
                "empty response body",
            ));
        }
        serde_json::from_str(&body).map_err(|e| ToolError::parse(format!("response from {}", url), e))
    }

    /// Raw `GlobalOptionSetDefinitions` payload
    pub async fn fetch_global_option_sets(&self) -> Result<Value> {
        let url = constants::global_option_sets_endpoint(&self.base_url);
        info!("Fetching global option set definitions");
        self.get_json(&url).await
    }
}

async fn ensure_success(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ToolError::Http {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn read_json_body<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T> {
    let body = response.text().await.map_err(|source| ToolError::Transport {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|e| ToolError::parse(format!("response from {}", url), e))
}
