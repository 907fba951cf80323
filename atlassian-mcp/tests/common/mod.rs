//! Shared fixture: an MCP server pointed at a wiremock Atlassian site.

#![allow(dead_code)]

use atlassian_mcp::clients::config::{AtlassianConfig, ServerConfig};
use atlassian_mcp::{Config, McpServer, ToolResult};
use serde_json::Value;
use wiremock::MockServer;

/// `Basic base64("bot@example.com:secret")`
pub const AUTH_HEADER: &str = "Basic Ym90QGV4YW1wbGUuY29tOnNlY3JldA==";

pub struct TestFixture {
    /// Mock Atlassian site.
    pub site: MockServer,
    /// Server under test.
    pub mcp: McpServer,
}

impl TestFixture {
    pub async fn new() -> Self {
        let site = MockServer::start().await;
        let config = Config {
            atlassian: AtlassianConfig {
                base_url: site.uri(),
                email: "bot@example.com".to_string(),
                token: "secret".to_string(),
            },
            server: ServerConfig::default(),
            debug: true,
            request_timeout_secs: 5,
        };
        let mcp = McpServer::from_config(&config).expect("server should build");
        Self { site, mcp }
    }

    /// Call a tool and expect it not to raise a protocol error.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolResult {
        self.mcp
            .call_tool(name, arguments)
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", name, e))
    }
}

/// Parse the first content block as JSON.
pub fn json_text(result: &ToolResult) -> Value {
    serde_json::from_str(result.first_text().expect("text content")).expect("JSON content")
}
