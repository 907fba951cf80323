//! Error types for tool execution
//!
//! Protocol-level failures (bad arguments, unknown tools, malformed resource
//! URIs, missing upstream fields) map to JSON-RPC error codes. Failures of the
//! Atlassian REST call itself are kept apart in [`ToolError::Upstream`] so the
//! dispatcher can turn them into readable error envelopes instead.

use crate::clients::atlassian::AtlassianError;
use crate::types::McpError;
use thiserror::Error;

/// Failure raised while executing a tool or reading a resource.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Caller-supplied arguments violate the tool contract
    #[error("{0}")]
    InvalidParams(String),

    /// Tool name or resource URI is not registered
    #[error("{0}")]
    MethodNotFound(String),

    /// Malformed request (e.g. unsupported resource URI)
    #[error("{0}")]
    InvalidRequest(String),

    /// A value assumed present in an upstream response was missing
    #[error("{0}")]
    Internal(String),

    /// The Atlassian REST call failed
    #[error("Atlassian API error: {}", .0.upstream_message())]
    Upstream(#[from] AtlassianError),
}

impl ToolError {
    /// Create an invalid params error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        ToolError::InvalidParams(message.into())
    }

    /// Create a method not found error
    pub fn method_not_found(message: impl Into<String>) -> Self {
        ToolError::MethodNotFound(message.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ToolError::InvalidRequest(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ToolError::Internal(message.into())
    }

    /// Whether this error belongs to the protocol's own error taxonomy.
    pub fn is_protocol_error(&self) -> bool {
        !matches!(self, ToolError::Upstream(_))
    }

    /// JSON-RPC error code for this error.
    pub fn error_code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) => McpError::INVALID_PARAMS,
            ToolError::MethodNotFound(_) => McpError::METHOD_NOT_FOUND,
            ToolError::InvalidRequest(_) => McpError::INVALID_REQUEST,
            ToolError::Internal(_) | ToolError::Upstream(_) => McpError::INTERNAL_ERROR,
        }
    }

    /// Category name for logging
    pub fn category(&self) -> &'static str {
        match self {
            ToolError::InvalidParams(_) => "invalid_params",
            ToolError::MethodNotFound(_) => "method_not_found",
            ToolError::InvalidRequest(_) => "invalid_request",
            ToolError::Internal(_) => "internal",
            ToolError::Upstream(_) => "upstream",
        }
    }

    /// Convert into a JSON-RPC error object.
    pub fn to_mcp_error(&self) -> McpError {
        McpError::new(self.error_code(), self.to_string())
    }
}

/// Result type for tool execution.
pub type ToolCallResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ToolError::invalid_params("x").error_code(), -32602);
        assert_eq!(ToolError::method_not_found("x").error_code(), -32601);
        assert_eq!(ToolError::invalid_request("x").error_code(), -32600);
        assert_eq!(ToolError::internal("x").error_code(), -32603);
    }

    #[test]
    fn test_upstream_is_not_protocol_error() {
        let err = ToolError::from(AtlassianError::Api {
            status: 404,
            message: "Issue does not exist".to_string(),
        });
        assert!(!err.is_protocol_error());
        assert_eq!(err.category(), "upstream");
        assert_eq!(err.to_string(), "Atlassian API error: Issue does not exist");

        assert!(ToolError::invalid_params("ticket_key is required").is_protocol_error());
    }

    #[test]
    fn test_to_mcp_error() {
        let err = ToolError::method_not_found("Unknown tool: nope").to_mcp_error();
        assert_eq!(err.code, McpError::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Unknown tool: nope");
    }
}
