//! JIRA tool definitions.

use crate::types::{ToolAnnotations, ToolDefinition};
use serde_json::{json, Value};

fn ticket_key() -> Value {
    json!({
        "type": "string",
        "description": "JIRA ticket key (e.g., CPDEV-3371)"
    })
}

fn project_ref() -> Value {
    json!({
        "project_key": {
            "type": "string",
            "description": "Project key (e.g., SCRUM)"
        },
        "project_id": {
            "type": "string",
            "description": "Project ID (alternative to project_key)"
        }
    })
}

/// Schema whose only property is the ticket key.
fn ticket_only() -> Value {
    json!({
        "type": "object",
        "properties": { "ticket_key": ticket_key() },
        "required": ["ticket_key"]
    })
}

fn project_only() -> Value {
    json!({
        "type": "object",
        "properties": project_ref(),
        "required": []
    })
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("get_jira_ticket", "Get details of a JIRA ticket by key")
            .with_schema(ticket_only())
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new("search_jira_tickets", "Search for JIRA tickets using JQL")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "jql": {
                        "type": "string",
                        "description": "JQL query string"
                    },
                    "max_results": {
                        "type": "number",
                        "description": "Maximum number of results to return",
                        "default": 10
                    }
                },
                "required": ["jql"]
            }))
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new("create_jira_ticket", "Create a new JIRA ticket")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "project_key": {
                        "type": "string",
                        "description": "Project key (e.g., CPDEV)"
                    },
                    "summary": {
                        "type": "string",
                        "description": "Ticket summary/title"
                    },
                    "description": {
                        "type": "string",
                        "description": "Ticket description"
                    },
                    "issue_type": {
                        "type": "string",
                        "description": "Issue type (e.g., Bug, Task, Story)",
                        "default": "Task"
                    }
                },
                "required": ["project_key", "summary", "description"]
            }))
            .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new(
            "update_jira_ticket",
            "Update fields of a JIRA ticket (summary, description, priority, labels)",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "ticket_key": ticket_key(),
                "summary": {
                    "type": "string",
                    "description": "Updated ticket summary/title"
                },
                "description": {
                    "type": "string",
                    "description": "Updated ticket description"
                },
                "priority": {
                    "type": "string",
                    "description": "Updated priority name (e.g., High, Medium, Low)"
                },
                "labels": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Updated labels (array of strings)"
                }
            },
            "required": ["ticket_key"]
        }))
        .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new("delete_jira_ticket", "Delete a JIRA ticket (if permissions allow)")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "ticket_key": ticket_key(),
                    "delete_subtasks": {
                        "type": "boolean",
                        "description": "Whether to delete subtasks",
                        "default": false
                    }
                },
                "required": ["ticket_key"]
            }))
            .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new(
            "transition_jira_ticket",
            "Change JIRA ticket status through workflow transitions",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "ticket_key": ticket_key(),
                "transition_id": {
                    "type": "string",
                    "description": "Transition ID (use get_jira_ticket_transitions to find available transitions)"
                },
                "transition_name": {
                    "type": "string",
                    "description": "Transition name (e.g., 'In Progress', 'Done') - alternative to transition_id"
                }
            },
            "required": ["ticket_key"]
        }))
        .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new(
            "get_jira_ticket_transitions",
            "Get available status transitions for a JIRA ticket",
        )
        .with_schema(ticket_only())
        .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new("assign_jira_ticket", "Assign a JIRA ticket to a user")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "ticket_key": ticket_key(),
                    "assignee": {
                        "type": "string",
                        "description": "User accountId, email address, or '-1' to unassign"
                    }
                },
                "required": ["ticket_key", "assignee"]
            }))
            .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new(
            "link_jira_tickets",
            "Link two JIRA tickets together (relates, blocks, duplicates, etc.)",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "outward_issue_key": {
                    "type": "string",
                    "description": "Outward issue key (e.g., CPDEV-3371)"
                },
                "inward_issue_key": {
                    "type": "string",
                    "description": "Inward issue key (e.g., CPDEV-3372)"
                },
                "link_type": {
                    "type": "string",
                    "description": "Link type (e.g., Relates, Duplicates, Blocks, Cloners)",
                    "default": "Relates"
                }
            },
            "required": ["outward_issue_key", "inward_issue_key"]
        }))
        .with_annotations(ToolAnnotations::destructive()),
        label_definition(
            "add_label_to_jira_ticket",
            "Add a label to a JIRA ticket for categorization",
            "Label to add to the ticket",
        ),
        label_definition(
            "remove_label_from_jira_ticket",
            "Remove a label from a JIRA ticket",
            "Label to remove from the ticket",
        ),
        // Comments
        ToolDefinition::new("add_comment_to_jira_ticket", "Add a comment to a JIRA ticket")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "ticket_key": ticket_key(),
                    "comment": {
                        "type": "string",
                        "description": "Comment text"
                    }
                },
                "required": ["ticket_key", "comment"]
            }))
            .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new("get_jira_ticket_comments", "Get all comments on a JIRA ticket")
            .with_schema(ticket_only())
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new("update_jira_comment", "Edit an existing comment on a JIRA ticket")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "ticket_key": ticket_key(),
                    "comment_id": {
                        "type": "string",
                        "description": "Comment ID to update"
                    },
                    "comment": {
                        "type": "string",
                        "description": "Updated comment text"
                    }
                },
                "required": ["ticket_key", "comment_id", "comment"]
            }))
            .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new("delete_jira_comment", "Delete a comment from a JIRA ticket")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "ticket_key": ticket_key(),
                    "comment_id": {
                        "type": "string",
                        "description": "Comment ID to delete"
                    }
                },
                "required": ["ticket_key", "comment_id"]
            }))
            .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new(
            "add_attachment_to_jira_ticket",
            "Upload file attachment to a JIRA ticket",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "ticket_key": ticket_key(),
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to attach"
                },
                "filename": {
                    "type": "string",
                    "description": "Optional: Custom filename for the attachment"
                }
            },
            "required": ["ticket_key", "file_path"]
        }))
        .with_annotations(ToolAnnotations::destructive()),
        // Worklogs
        ToolDefinition::new("add_worklog_to_jira_ticket", "Log time spent on a JIRA ticket")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "ticket_key": ticket_key(),
                    "time_spent": {
                        "type": "string",
                        "description": "Time spent (e.g., '2h 30m', '1d', '45m')"
                    },
                    "started": {
                        "type": "string",
                        "description": "Start date/time in ISO 8601 format (e.g., '2025-12-03T10:00:00.000+0000')"
                    },
                    "comment": {
                        "type": "string",
                        "description": "Optional: Comment describing the work done"
                    }
                },
                "required": ["ticket_key", "time_spent", "started"]
            }))
            .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new(
            "get_jira_ticket_worklogs",
            "Retrieve all worklog entries for a JIRA ticket",
        )
        .with_schema(ticket_only())
        .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "update_jira_worklog",
            "Modify an existing worklog entry on a JIRA ticket",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "ticket_key": ticket_key(),
                "worklog_id": {
                    "type": "string",
                    "description": "Worklog ID to update"
                },
                "time_spent": {
                    "type": "string",
                    "description": "Updated time spent (e.g., '2h 30m', '1d', '45m')"
                },
                "started": {
                    "type": "string",
                    "description": "Updated start date/time in ISO 8601 format"
                },
                "comment": {
                    "type": "string",
                    "description": "Updated comment describing the work done"
                }
            },
            "required": ["ticket_key", "worklog_id"]
        }))
        .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new("delete_jira_worklog", "Remove a worklog entry from a JIRA ticket")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "ticket_key": ticket_key(),
                    "worklog_id": {
                        "type": "string",
                        "description": "Worklog ID to delete"
                    }
                },
                "required": ["ticket_key", "worklog_id"]
            }))
            .with_annotations(ToolAnnotations::destructive()),
        // Watchers
        ToolDefinition::new(
            "add_watcher_to_jira_ticket",
            "Add a user as a watcher to a JIRA ticket",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "ticket_key": ticket_key(),
                "account_id": {
                    "type": "string",
                    "description": "User account ID (e.g., '557058:dba3e95c-4829-4a28-b0ed-e0efa4044a92')"
                },
                "email": {
                    "type": "string",
                    "description": "User email address (alternative to account_id, will be looked up)"
                }
            },
            "required": ["ticket_key"]
        }))
        .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new(
            "remove_watcher_from_jira_ticket",
            "Remove a watcher from a JIRA ticket",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "ticket_key": ticket_key(),
                "username": {
                    "type": "string",
                    "description": "Username of the watcher to remove"
                },
                "account_id": {
                    "type": "string",
                    "description": "Account ID of the watcher (alternative to username, will be looked up)"
                }
            },
            "required": ["ticket_key"]
        }))
        .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new("get_jira_ticket_watchers", "List all watchers of a JIRA ticket")
            .with_schema(ticket_only())
            .with_annotations(ToolAnnotations::read_only()),
        // Project metadata
        ToolDefinition::new("get_jira_projects", "Get list of all JIRA projects")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "project_keys": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional: Filter by specific project keys"
                    }
                },
                "required": []
            }))
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "get_jira_project",
            "Get detailed information about a JIRA project",
        )
        .with_schema(project_only())
        .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new("get_jira_components", "Get all components for a JIRA project")
            .with_schema(project_only())
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "get_jira_issue_types",
            "Get available issue types for a project or globally",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "project_key": {
                    "type": "string",
                    "description": "Project key (optional, if not provided returns all issue types)"
                },
                "project_id": {
                    "type": "string",
                    "description": "Project ID (optional, alternative to project_key)"
                }
            },
            "required": []
        }))
        .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "get_jira_priorities",
            "Get all available priority options in Jira",
        )
        .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "get_jira_statuses",
            "Get all available statuses for a JIRA project",
        )
        .with_schema(project_only())
        .with_annotations(ToolAnnotations::read_only()),
    ]
}

fn label_definition(name: &str, description: &str, label_description: &str) -> ToolDefinition {
    ToolDefinition::new(name, description)
        .with_schema(json!({
            "type": "object",
            "properties": {
                "ticket_key": ticket_key(),
                "label": {
                    "type": "string",
                    "description": label_description
                }
            },
            "required": ["ticket_key", "label"]
        }))
        .with_annotations(ToolAnnotations::idempotent_write())
}
