//! # Atlassian MCP
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! JIRA and Confluence Cloud operations as callable tools.
//!
//! ## Overview
//!
//! The atlassian-mcp crate handles:
//! - **Tools**: 52 JIRA and Confluence tools, listed from a static catalog and
//!   dispatched through a name-keyed registry
//! - **Resources**: recent tickets, the space list and individual pages
//! - **JSON-RPC**: MCP protocol over newline-delimited stdio
//! - **Client**: a pre-authenticated REST client for the Atlassian site
//!
//! ## MCP Protocol
//!
//! Supported methods:
//! - `initialize`: Initialize the MCP session
//! - `tools/list`: List available tools
//! - `tools/call`: Execute a tool
//! - `resources/list`: List available resources
//! - `resources/read`: Read a resource
//! - `ping`: Liveness check
//!
//! ## Errors
//!
//! Invalid arguments, unknown tools and malformed resource URIs are returned
//! as JSON-RPC errors. A failed Atlassian REST call is not: the caller gets a
//! normal tool result with `isError: true` and the text
//! `Atlassian API error: <message>`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atlassian_mcp::{Config, McpServer, McpRequest};
//!
//! async fn handle(json: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let server = McpServer::from_config(&Config::load()?)?;
//!     let request: McpRequest = serde_json::from_str(json)?;
//!     if let Some(response) = server.handle_request(request).await {
//!         println!("{}", serde_json::to_string(&response)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adf;
pub mod cache;
pub mod catalog;
pub mod clients;
pub mod error;
pub mod query;
pub mod registry;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;
pub mod types;
pub mod validation;

// Re-export main types
pub use error::{ToolCallResult, ToolError};
pub use registry::{default_registry, RegistryError, ToolRegistry};
pub use server::{McpServer, StartupError, PROTOCOL_VERSION};
pub use tools::{ToolContext, ToolHandler};
pub use transport::{run_stdio, serve, TransportError};
pub use types::{
    ContentBlock, McpError, McpRequest, McpResponse, RequestId, ResourceCapabilities,
    ResourceContents, ResourceDefinition, ServerCapabilities, ServerInfo, ToolAnnotations,
    ToolCall, ToolCapabilities, ToolDefinition, ToolResult,
};
pub use validation::ToolArgs;

// Re-export the Atlassian client
pub use cache::TtlCache;
pub use clients::{AtlassianClient, AtlassianError, Config, ConfigError};
