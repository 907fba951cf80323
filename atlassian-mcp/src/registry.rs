//! Tool name to handler tables
//!
//! Each domain builds its own registry; the server merges them once at
//! startup. A name registered twice is an error rather than a silent
//! overwrite.

use crate::tools::ToolHandler;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two handlers claim the same tool name.
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),
}

/// Mapping from tool name to handler.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`.
    pub fn register<H>(&mut self, name: &str, handler: H) -> Result<&mut Self, RegistryError>
    where
        H: ToolHandler + 'static,
    {
        self.insert(name.to_string(), Arc::new(handler))?;
        Ok(self)
    }

    fn insert(&mut self, name: String, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Combine several registries, rejecting names that appear more than once.
    pub fn merge<I>(sources: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ToolRegistry>,
    {
        let mut merged = Self::new();
        for source in sources {
            for (name, handler) in source.handlers {
                merged.insert(name, handler)?;
            }
        }
        Ok(merged)
    }

    /// Look up a handler.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Whether a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Every JIRA and Confluence tool in one table.
pub fn default_registry() -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::merge([
        crate::tools::jira::jira_registry()?,
        crate::tools::confluence::confluence_registry()?,
    ])
}
