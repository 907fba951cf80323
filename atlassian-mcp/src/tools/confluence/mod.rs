//! Confluence tools
//!
//! Handlers for pages, spaces, comments and attachments against the
//! `/wiki/rest/api` API. Page and comment bodies use the storage
//! representation.

pub mod attachments;
pub mod comments;
pub mod pages;
pub mod spaces;

use crate::error::ToolCallResult;
use crate::registry::{RegistryError, ToolRegistry};
use crate::validation::ToolArgs;
use serde_json::{json, Value};

/// Path of a content item (page, comment or attachment).
pub(crate) fn content_path(id: &str) -> String {
    format!("/wiki/rest/api/content/{}", id)
}

/// `body` object holding storage-format markup.
pub(crate) fn storage_body(value: &str) -> Value {
    json!({
        "storage": { "value": value, "representation": "storage" }
    })
}

/// Arguments naming a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub page_id: String,
}

impl PageParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            page_id: args.require_string("page_id")?,
        })
    }
}

/// All Confluence tools.
pub fn confluence_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry
        .register("get_confluence_page", pages::get_confluence_page)?
        .register("create_confluence_page", pages::create_confluence_page)?
        .register("update_confluence_page", pages::update_confluence_page)?
        .register("delete_confluence_page", pages::delete_confluence_page)?
        .register("get_confluence_page_history", pages::get_confluence_page_history)?
        .register("get_confluence_page_children", pages::get_confluence_page_children)?
        .register("get_confluence_page_ancestors", pages::get_confluence_page_ancestors)?
        .register("add_label_to_confluence_page", pages::add_label_to_confluence_page)?
        .register("remove_label_from_confluence_page", pages::remove_label_from_confluence_page)?
        .register("get_confluence_page_labels", pages::get_confluence_page_labels)?
        .register("search_confluence", spaces::search_confluence)?
        .register("search_confluence_by_space", spaces::search_confluence_by_space)?
        .register("search_confluence_by_label", spaces::search_confluence_by_label)?
        .register("get_confluence_spaces", spaces::get_confluence_spaces)?
        .register("get_confluence_space", spaces::get_confluence_space)?
        .register("get_confluence_space_content", spaces::get_confluence_space_content)?
        .register("add_comment_to_confluence_page", comments::add_comment_to_confluence_page)?
        .register("get_confluence_page_comments", comments::get_confluence_page_comments)?
        .register("update_confluence_comment", comments::update_confluence_comment)?
        .register("delete_confluence_comment", comments::delete_confluence_comment)?
        .register("get_confluence_page_attachments", attachments::get_confluence_page_attachments)?
        .register(
            "upload_attachment_to_confluence_page",
            attachments::upload_attachment_to_confluence_page,
        )?
        .register("download_confluence_attachment", attachments::download_confluence_attachment)?;
    Ok(registry)
}
