//! JIRA tools
//!
//! Handlers for issues, their comments, worklogs, watchers and attachments,
//! and project metadata, all against the `/rest/api/3` API.

pub mod activity;
pub mod issues;
pub mod projects;

use crate::error::ToolCallResult;
use crate::registry::{RegistryError, ToolRegistry};
use crate::validation::ToolArgs;

/// Fields returned by `get_jira_ticket` and the ticket resource.
pub const TICKET_FIELDS: &str =
    "summary,description,status,created,updated,assignee,reporter,priority,issuetype";

/// Fields returned by searches.
pub const SEARCH_FIELDS: &str = "summary,status,created,updated";

/// Path of a single issue.
pub(crate) fn issue_path(ticket_key: &str) -> String {
    format!("/rest/api/3/issue/{}", ticket_key)
}

/// Arguments naming a single ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketParams {
    pub ticket_key: String,
}

impl TicketParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            ticket_key: args.require_string("ticket_key")?,
        })
    }
}

/// Arguments naming a project by key or id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectParams {
    /// Project key or numeric id, key preferred.
    pub project: String,
}

impl ProjectParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            project: args.require_either("project_key", "project_id")?,
        })
    }
}

/// All JIRA tools.
pub fn jira_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry
        .register("get_jira_ticket", issues::get_jira_ticket)?
        .register("search_jira_tickets", issues::search_jira_tickets)?
        .register("create_jira_ticket", issues::create_jira_ticket)?
        .register("update_jira_ticket", issues::update_jira_ticket)?
        .register("delete_jira_ticket", issues::delete_jira_ticket)?
        .register("transition_jira_ticket", issues::transition_jira_ticket)?
        .register("get_jira_ticket_transitions", issues::get_jira_ticket_transitions)?
        .register("assign_jira_ticket", issues::assign_jira_ticket)?
        .register("link_jira_tickets", issues::link_jira_tickets)?
        .register("add_label_to_jira_ticket", issues::add_label_to_jira_ticket)?
        .register("remove_label_from_jira_ticket", issues::remove_label_from_jira_ticket)?
        .register("add_comment_to_jira_ticket", activity::add_comment_to_jira_ticket)?
        .register("get_jira_ticket_comments", activity::get_jira_ticket_comments)?
        .register("update_jira_comment", activity::update_jira_comment)?
        .register("delete_jira_comment", activity::delete_jira_comment)?
        .register("add_attachment_to_jira_ticket", activity::add_attachment_to_jira_ticket)?
        .register("add_worklog_to_jira_ticket", activity::add_worklog_to_jira_ticket)?
        .register("get_jira_ticket_worklogs", activity::get_jira_ticket_worklogs)?
        .register("update_jira_worklog", activity::update_jira_worklog)?
        .register("delete_jira_worklog", activity::delete_jira_worklog)?
        .register("add_watcher_to_jira_ticket", activity::add_watcher_to_jira_ticket)?
        .register("remove_watcher_from_jira_ticket", activity::remove_watcher_from_jira_ticket)?
        .register("get_jira_ticket_watchers", activity::get_jira_ticket_watchers)?
        .register("get_jira_projects", projects::get_jira_projects)?
        .register("get_jira_project", projects::get_jira_project)?
        .register("get_jira_components", projects::get_jira_components)?
        .register("get_jira_issue_types", projects::get_jira_issue_types)?
        .register("get_jira_priorities", projects::get_jira_priorities)?
        .register("get_jira_statuses", projects::get_jira_statuses)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jira_registry_size() {
        assert_eq!(jira_registry().unwrap().len(), 29);
    }

    #[test]
    fn test_project_params_prefers_key() {
        let args = ToolArgs::new(json!({"project_key": "ENG", "project_id": "10000"}));
        assert_eq!(ProjectParams::from_args(&args).unwrap().project, "ENG");

        let args = ToolArgs::new(json!({"project_id": 10000}));
        assert_eq!(ProjectParams::from_args(&args).unwrap().project, "10000");

        assert!(ProjectParams::from_args(&ToolArgs::default()).is_err());
    }
}
