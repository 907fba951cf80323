//! Static tool catalog returned by `tools/list`
//!
//! Definitions are built on first use and shared for the life of the process.

mod confluence;
mod jira;

use crate::types::ToolDefinition;
use std::sync::OnceLock;

static CATALOG: OnceLock<Vec<ToolDefinition>> = OnceLock::new();

/// All tool definitions, JIRA first then Confluence.
pub fn tool_definitions() -> &'static [ToolDefinition] {
    CATALOG.get_or_init(|| {
        let mut definitions = jira::definitions();
        definitions.extend(confluence::definitions());
        definitions
    })
}

/// Look up one definition by tool name.
pub fn find(name: &str) -> Option<&'static ToolDefinition> {
    tool_definitions().iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_registry;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_matches_registry() {
        let registry = default_registry().unwrap();
        let mut names: Vec<&str> = tool_definitions().iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, registry.names());
    }

    #[test]
    fn test_names_are_unique() {
        let unique: HashSet<&str> = tool_definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(unique.len(), tool_definitions().len());
        assert_eq!(tool_definitions().len(), 52);
    }

    #[test]
    fn test_required_fields_are_declared() {
        for definition in tool_definitions() {
            let properties = definition.property_names();
            for required in definition.required_fields() {
                assert!(
                    properties.contains(&required),
                    "{} requires undeclared {}",
                    definition.name,
                    required
                );
            }
        }
    }

    #[test]
    fn test_catalog_is_memoized() {
        let first = tool_definitions().as_ptr();
        assert_eq!(first, tool_definitions().as_ptr());
    }

    #[test]
    fn test_annotations() {
        let get = find("get_jira_ticket").unwrap();
        assert_eq!(get.annotations.read_only_hint, Some(true));
        assert_eq!(get.annotations.destructive_hint, None);

        let assign = find("assign_jira_ticket").unwrap();
        assert_eq!(assign.annotations.read_only_hint, Some(false));
        assert_eq!(assign.annotations.destructive_hint, Some(true));
        assert_eq!(assign.annotations.idempotent_hint, Some(true));

        let priorities = find("get_jira_priorities").unwrap();
        assert!(priorities.property_names().is_empty());
        assert!(find("no_such_tool").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(find("update_confluence_page").unwrap()).unwrap();
        assert_eq!(value["inputSchema"]["required"], serde_json::json!(["page_id"]));
        assert_eq!(value["annotations"]["idempotentHint"], true);
    }
}
