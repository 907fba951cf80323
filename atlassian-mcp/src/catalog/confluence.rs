//! Confluence tool definitions.

use crate::types::{ToolAnnotations, ToolDefinition};
use serde_json::{json, Value};

fn page_id() -> Value {
    json!({
        "type": "string",
        "description": "Confluence page ID"
    })
}

fn space_key() -> Value {
    json!({
        "type": "string",
        "description": "Confluence space key (e.g., SD, Engineering)"
    })
}

fn limit(default: u32) -> Value {
    json!({
        "type": "number",
        "description": "Maximum number of results",
        "default": default
    })
}

fn page_only() -> Value {
    json!({
        "type": "object",
        "properties": { "page_id": page_id() },
        "required": ["page_id"]
    })
}

fn read_page(name: &str, description: &str) -> ToolDefinition {
    ToolDefinition::new(name, description)
        .with_schema(page_only())
        .with_annotations(ToolAnnotations::read_only())
}

fn page_label(name: &str, description: &str, label_description: &str) -> ToolDefinition {
    ToolDefinition::new(name, description)
        .with_schema(json!({
            "type": "object",
            "properties": {
                "page_id": page_id(),
                "label": {
                    "type": "string",
                    "description": label_description
                }
            },
            "required": ["page_id", "label"]
        }))
        .with_annotations(ToolAnnotations::idempotent_write())
}

pub(super) fn definitions() -> Vec<ToolDefinition> {
    vec![
        read_page("get_confluence_page", "Get a Confluence page by ID"),
        ToolDefinition::new("create_confluence_page", "Create a new Confluence page")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "space_key": space_key(),
                    "title": {
                        "type": "string",
                        "description": "Page title"
                    },
                    "content": {
                        "type": "string",
                        "description": "Page content in Confluence storage format (HTML)"
                    },
                    "parent_id": {
                        "type": "string",
                        "description": "Optional: Parent page ID for creating child pages"
                    }
                },
                "required": ["space_key", "title"]
            }))
            .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new("update_confluence_page", "Update an existing Confluence page")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "page_id": page_id(),
                    "title": {
                        "type": "string",
                        "description": "Updated page title"
                    },
                    "content": {
                        "type": "string",
                        "description": "Updated page content in Confluence storage format (HTML)"
                    },
                    "version": {
                        "type": "number",
                        "description": "Optional: Specific version number (for conflict resolution)"
                    }
                },
                "required": ["page_id"]
            }))
            .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new("delete_confluence_page", "Delete a Confluence page")
            .with_schema(page_only())
            .with_annotations(ToolAnnotations::destructive()),
        read_page(
            "get_confluence_page_history",
            "Get version history of a Confluence page",
        ),
        ToolDefinition::new(
            "get_confluence_page_children",
            "Get child pages (sub-pages) of a Confluence page",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "page_id": page_id(),
                "limit": limit(25)
            },
            "required": ["page_id"]
        }))
        .with_annotations(ToolAnnotations::read_only()),
        read_page(
            "get_confluence_page_ancestors",
            "Get parent pages (ancestors) of a Confluence page",
        ),
        page_label(
            "add_label_to_confluence_page",
            "Add a label to a Confluence page for categorization",
            "Label to add to the page",
        ),
        page_label(
            "remove_label_from_confluence_page",
            "Remove a label from a Confluence page",
            "Label to remove from the page",
        ),
        read_page("get_confluence_page_labels", "Get all labels on a Confluence page"),
        // Search and spaces
        ToolDefinition::new("search_confluence", "Search for content in Confluence")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    },
                    "limit": limit(10)
                },
                "required": ["query"]
            }))
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "search_confluence_by_space",
            "Search for content within a specific Confluence space",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "space_key": space_key(),
                "query": {
                    "type": "string",
                    "description": "Search query text"
                },
                "limit": limit(10)
            },
            "required": ["space_key", "query"]
        }))
        .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new("search_confluence_by_label", "Search for Confluence pages by label")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "label": {
                        "type": "string",
                        "description": "Label to search for"
                    },
                    "limit": limit(10)
                },
                "required": ["label"]
            }))
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new("get_confluence_spaces", "List all Confluence spaces")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "space_keys": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional: Filter by specific space keys"
                    }
                },
                "required": []
            }))
            .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "get_confluence_space",
            "Get detailed information about a specific Confluence space",
        )
        .with_schema(json!({
            "type": "object",
            "properties": { "space_key": space_key() },
            "required": ["space_key"]
        }))
        .with_annotations(ToolAnnotations::read_only()),
        ToolDefinition::new(
            "get_confluence_space_content",
            "List all pages and content within a Confluence space",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "space_key": space_key(),
                "limit": limit(100)
            },
            "required": ["space_key"]
        }))
        .with_annotations(ToolAnnotations::read_only()),
        // Comments
        ToolDefinition::new(
            "add_comment_to_confluence_page",
            "Add a comment to a Confluence page",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "page_id": page_id(),
                "comment": {
                    "type": "string",
                    "description": "Comment text"
                },
                "space_key": {
                    "type": "string",
                    "description": "Optional: Space key (skips API call if provided)"
                }
            },
            "required": ["page_id", "comment"]
        }))
        .with_annotations(ToolAnnotations::destructive()),
        read_page(
            "get_confluence_page_comments",
            "Get all comments on a Confluence page",
        ),
        ToolDefinition::new(
            "update_confluence_comment",
            "Edit an existing comment on a Confluence page",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "comment_id": {
                    "type": "string",
                    "description": "Comment ID to update"
                },
                "comment": {
                    "type": "string",
                    "description": "Updated comment text"
                }
            },
            "required": ["comment_id", "comment"]
        }))
        .with_annotations(ToolAnnotations::idempotent_write()),
        ToolDefinition::new(
            "delete_confluence_comment",
            "Delete a comment from a Confluence page",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "comment_id": {
                    "type": "string",
                    "description": "Comment ID to delete"
                }
            },
            "required": ["comment_id"]
        }))
        .with_annotations(ToolAnnotations::destructive()),
        // Attachments
        read_page(
            "get_confluence_page_attachments",
            "List all attachments on a Confluence page",
        ),
        ToolDefinition::new(
            "upload_attachment_to_confluence_page",
            "Upload a file as an attachment to a Confluence page",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "page_id": page_id(),
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to upload"
                },
                "comment": {
                    "type": "string",
                    "description": "Optional comment for the attachment"
                }
            },
            "required": ["page_id", "file_path"]
        }))
        .with_annotations(ToolAnnotations::destructive()),
        ToolDefinition::new(
            "download_confluence_attachment",
            "Get download URL and metadata for a Confluence attachment",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "attachment_id": {
                    "type": "string",
                    "description": "Attachment ID (alternative to page_id + filename)"
                },
                "page_id": {
                    "type": "string",
                    "description": "Page ID (required if attachment_id not provided)"
                },
                "filename": {
                    "type": "string",
                    "description": "Filename (required if attachment_id not provided)"
                }
            },
            "required": []
        }))
        .with_annotations(ToolAnnotations::read_only()),
    ]
}
