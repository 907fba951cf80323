//! JIRA and Confluence tool handlers
//!
//! Every tool is an async function taking the raw argument bundle and a
//! [`ToolContext`]. Handlers parse their arguments into a typed struct first,
//! then issue one REST call (two when a prerequisite read is needed) and
//! shape the response into a [`ToolResult`].

pub mod confluence;
pub mod jira;
pub mod users;

use crate::cache::TtlCache;
use crate::clients::AtlassianClient;
use crate::error::{ToolCallResult, ToolError};
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use async_trait::async_trait;
use reqwest::multipart::Part;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Authenticated Atlassian client
    pub client: AtlassianClient,

    /// Reference-data cache
    pub cache: Arc<TtlCache<Value>>,
}

impl ToolContext {
    /// Create a context with a fresh cache.
    pub fn new(client: AtlassianClient) -> Self {
        Self::with_cache(client, Arc::new(TtlCache::new()))
    }

    /// Create a context around an existing cache.
    pub fn with_cache(client: AtlassianClient, cache: Arc<TtlCache<Value>>) -> Self {
        Self { client, cache }
    }
}

/// A callable tool implementation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with given arguments.
    async fn call(&self, args: ToolArgs, context: ToolContext) -> ToolCallResult<ToolResult>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(ToolArgs, ToolContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolCallResult<ToolResult>> + Send + 'static,
{
    async fn call(&self, args: ToolArgs, context: ToolContext) -> ToolCallResult<ToolResult> {
        (self)(args, context).await
    }
}

/// Clone the value at a JSON pointer, or `Null` when absent.
pub(crate) fn field(value: &Value, pointer: &str) -> Value {
    value.pointer(pointer).cloned().unwrap_or(Value::Null)
}

/// Read a local file into a multipart `file` part.
///
/// An unreadable path is reported as `File not found`.
pub(crate) async fn file_part(file_path: &str, filename: Option<String>) -> ToolCallResult<Part> {
    let bytes = tokio::fs::read(file_path)
        .await
        .map_err(|_| ToolError::invalid_params(format!("File not found: {}", file_path)))?;

    let name = filename.unwrap_or_else(|| {
        Path::new(file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string()
    });
    debug!("Uploading {} ({} bytes)", name, bytes.len());

    Ok(Part::bytes(bytes).file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_part_missing_file() {
        let err = file_part("/definitely/not/here.txt", None).await.unwrap_err();
        assert_eq!(err.to_string(), "File not found: /definitely/not/here.txt");
    }

    #[tokio::test]
    async fn test_file_part_reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"report").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert!(file_part(&path, Some("renamed.txt".to_string())).await.is_ok());
    }

    #[test]
    fn test_field_defaults_to_null() {
        let value = serde_json::json!({"a": {"b": 1}});
        assert_eq!(field(&value, "/a/b"), 1);
        assert_eq!(field(&value, "/a/c"), Value::Null);
    }
}
