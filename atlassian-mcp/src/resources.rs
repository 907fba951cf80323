//! Readable resources
//!
//! Recent JIRA tickets and the Confluence space list are advertised through
//! `resources/list`; tickets, the space list and individual pages can be read
//! through `resources/read`.

use crate::clients::AtlassianClient;
use crate::error::{ToolCallResult, ToolError};
use crate::tools::confluence::content_path;
use crate::tools::confluence::pages::PAGE_EXPAND;
use crate::tools::jira::{issue_path, SEARCH_FIELDS, TICKET_FIELDS};
use crate::types::{ResourceContents, ResourceDefinition};
use serde_json::Value;
use tracing::{debug, error, instrument};

const JSON_MIME: &str = "application/json";
const TICKET_PREFIX: &str = "jira://ticket/";
const PAGE_PREFIX: &str = "confluence://page/";
const SPACES_URI: &str = "confluence://spaces";

/// JQL used to pick the tickets advertised as resources.
pub const RECENT_TICKETS_JQL: &str = "updated >= -30d ORDER BY created DESC";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// `jira://ticket/<key>`
    Ticket(String),
    /// `confluence://spaces`
    Spaces,
    /// `confluence://page/<id>`
    Page(String),
}

impl ResourceUri {
    /// Parse a URI, rejecting unknown schemes with `InvalidRequest`.
    pub fn parse(uri: &str) -> ToolCallResult<Self> {
        if let Some(key) = uri.strip_prefix(TICKET_PREFIX) {
            return Ok(ResourceUri::Ticket(key.to_string()));
        }
        if uri == SPACES_URI {
            return Ok(ResourceUri::Spaces);
        }
        if let Some(id) = uri.strip_prefix(PAGE_PREFIX) {
            return Ok(ResourceUri::Page(id.to_string()));
        }
        Err(ToolError::invalid_request(format!(
            "Unsupported resource URI: {}",
            uri
        )))
    }
}

fn ticket_resource(issue: &Value) -> Option<ResourceDefinition> {
    let key = issue.get("key").and_then(Value::as_str)?;
    let summary = issue
        .pointer("/fields/summary")
        .and_then(Value::as_str)
        .unwrap_or("");
    let status = issue
        .pointer("/fields/status/name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");

    Some(ResourceDefinition {
        uri: format!("{}{}", TICKET_PREFIX, key),
        name: format!("JIRA Ticket: {}", key),
        description: Some(format!("{} ({})", summary, status)),
        mime_type: Some(JSON_MIME.to_string()),
    })
}

fn spaces_resource() -> ResourceDefinition {
    ResourceDefinition {
        uri: SPACES_URI.to_string(),
        name: "Confluence Spaces".to_string(),
        description: Some("List of available Confluence spaces".to_string()),
        mime_type: Some(JSON_MIME.to_string()),
    }
}

/// Recent tickets plus the space list.
///
/// Any upstream failure is logged and yields an empty list.
#[instrument(skip_all)]
pub async fn list_resources(client: &AtlassianClient) -> Vec<ResourceDefinition> {
    let search = client
        .get(
            "/rest/api/3/search/jql",
            &[
                ("jql", RECENT_TICKETS_JQL.to_string()),
                ("maxResults", "10".to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ],
        )
        .await;

    match search {
        Ok(response) => {
            let mut resources: Vec<ResourceDefinition> = response
                .get("issues")
                .and_then(Value::as_array)
                .map(|issues| issues.iter().filter_map(ticket_resource).collect())
                .unwrap_or_default();
            resources.push(spaces_resource());
            debug!("Listing {} resources", resources.len());
            resources
        }
        Err(e) => {
            error!("Error listing resources: {}", e);
            Vec::new()
        }
    }
}

/// Read one resource as pretty-printed JSON.
#[instrument(skip(client))]
pub async fn read_resource(
    client: &AtlassianClient,
    uri: &str,
) -> ToolCallResult<Vec<ResourceContents>> {
    let fetched = match ResourceUri::parse(uri)? {
        ResourceUri::Ticket(key) => {
            client
                .get(&issue_path(&key), &[("fields", TICKET_FIELDS.to_string())])
                .await
        }
        ResourceUri::Spaces => {
            client
                .get("/wiki/rest/api/space", &[("limit", "25".to_string())])
                .await
        }
        ResourceUri::Page(id) => {
            client
                .get(&content_path(&id), &[("expand", PAGE_EXPAND.to_string())])
                .await
        }
    };

    let data = fetched.map_err(|e| {
        error!("Error reading resource {}: {}", uri, e);
        ToolError::internal(format!("Atlassian API error: {}", e.upstream_message()))
    })?;
    let text = serde_json::to_string_pretty(&data)
        .map_err(|e| ToolError::internal(format!("Failed to serialize resource: {}", e)))?;

    Ok(vec![ResourceContents {
        uri: uri.to_string(),
        mime_type: JSON_MIME.to_string(),
        text,
    }])
}
