//! MCP server implementation
//!
//! Routes JSON-RPC requests to the static catalog, the tool registry and the
//! resource handlers. Tool dispatch is the one place where upstream HTTP
//! failures are turned into `isError` results; every other error kind goes
//! back to the caller as a JSON-RPC error object.

use crate::catalog;
use crate::clients::{AtlassianClient, AtlassianError, Config};
use crate::error::{ToolCallResult, ToolError};
use crate::registry::{default_registry, RegistryError, ToolRegistry};
use crate::resources;
use crate::tools::ToolContext;
use crate::types::*;
use crate::validation::ToolArgs;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// MCP protocol revision spoken by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Failures while assembling the server.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The HTTP client could not be built
    #[error("Failed to create Atlassian client: {0}")]
    Client(#[from] AtlassianError),

    /// Two tools share a name
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// `resources/read` parameters.
#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: String,
}

/// Atlassian MCP server.
#[derive(Debug)]
pub struct McpServer {
    /// Server info
    info: ServerInfo,

    /// Server capabilities
    capabilities: ServerCapabilities,

    /// Tool handlers by name
    registry: ToolRegistry,

    /// Client and cache shared by all handlers
    context: ToolContext,
}

impl McpServer {
    /// Create a server around an existing registry and context.
    pub fn new(info: ServerInfo, registry: ToolRegistry, context: ToolContext) -> Self {
        Self {
            info,
            capabilities: ServerCapabilities {
                tools: Some(ToolCapabilities::default()),
                resources: Some(ResourceCapabilities::default()),
            },
            registry,
            context,
        }
    }

    /// Build the client, registry and context described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let client = AtlassianClient::from_config(config)?;
        let info = ServerInfo {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
        };
        Ok(Self::new(info, default_registry()?, ToolContext::new(client)))
    }

    /// Get server info.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get the tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get the shared handler context.
    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    /// Execute a tool.
    ///
    /// Upstream failures come back as `Ok` with `is_error` set; protocol
    /// errors are returned as `Err`.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolCallResult<ToolResult> {
        let handler = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::method_not_found(format!("Unknown tool: {}", name)))?;

        debug!("Calling tool {}", name);
        match handler.call(ToolArgs::new(arguments), self.context.clone()).await {
            Ok(result) => Ok(result),
            Err(ToolError::Upstream(e)) => {
                error!(tool = name, status = ?e.status(), "Error executing tool: {}", e);
                Ok(ToolResult::error(format!(
                    "Atlassian API error: {}",
                    e.upstream_message()
                )))
            }
            Err(e) => {
                warn!(tool = name, category = e.category(), "Tool call rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Handle an MCP request. Notifications produce no response.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        if request.is_notification() {
            debug!("Received notification {}", request.method);
            return None;
        }

        let id = request.id.unwrap_or_default();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => McpResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => self.handle_resources_list(id).await,
            "resources/read" => self.handle_resources_read(id, request.params).await,
            method => McpResponse::error(id, McpError::method_not_found(method)),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: RequestId) -> McpResponse {
        McpResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": self.capabilities,
                "serverInfo": self.info
            }),
        )
    }

    fn handle_tools_list(&self, id: RequestId) -> McpResponse {
        McpResponse::success(id, json!({ "tools": catalog::tool_definitions() }))
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        match self.call_tool(&call.name, call.arguments).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(value) => McpResponse::success(id, value),
                Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
            },
            Err(e) => McpResponse::error(id, e.to_mcp_error()),
        }
    }

    async fn handle_resources_list(&self, id: RequestId) -> McpResponse {
        let resources = resources::list_resources(&self.context.client).await;
        McpResponse::success(id, json!({ "resources": resources }))
    }

    async fn handle_resources_read(&self, id: RequestId, params: Option<Value>) -> McpResponse {
        let params: ReadResourceParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        match resources::read_resource(&self.context.client, &params.uri).await {
            Ok(contents) => McpResponse::success(id, json!({ "contents": contents })),
            Err(e) => McpResponse::error(id, e.to_mcp_error()),
        }
    }
}
