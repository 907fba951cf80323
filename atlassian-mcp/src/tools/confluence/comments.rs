//! Page comment tools.

use super::{content_path, storage_body, PageParams};
use crate::error::{ToolCallResult, ToolError};
use crate::tools::{field, ToolContext};
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use serde_json::{json, Value};
use tracing::instrument;

fn space_key_of(content: &Value) -> Option<String> {
    content
        .pointer("/space/key")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(String::from)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCommentParams {
    pub page_id: String,
    pub comment: String,
    /// Taken from the page when absent.
    pub space_key: Option<String>,
}

impl AddCommentParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            page_id: args.require_string("page_id")?,
            comment: args.require_string("comment")?,
            space_key: args.optional_string("space_key"),
        })
    }
}

/// Comment on a page. Looks up the page's space when none is given.
#[instrument(skip_all, fields(tool = "add_comment_to_confluence_page"))]
pub async fn add_comment_to_confluence_page(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = AddCommentParams::from_args(&args)?;

    let space_key = match params.space_key {
        Some(key) => key,
        None => {
            let page = ctx
                .client
                .get(
                    &content_path(&params.page_id),
                    &[("expand", "space".to_string())],
                )
                .await?;
            space_key_of(&page)
                .ok_or_else(|| ToolError::internal("Could not determine space from parent page"))?
        }
    };

    let created = ctx
        .client
        .post(
            "/wiki/rest/api/content",
            &json!({
                "type": "comment",
                "space": { "key": space_key },
                "container": { "id": params.page_id, "type": "page" },
                "body": storage_body(&params.comment)
            }),
        )
        .await?;

    Ok(ToolResult::success(json!({
        "id": field(&created, "/id"),
        "page_id": params.page_id,
        "comment": params.comment,
        "url": field(&created, "/_links/webui")
    })))
}

#[instrument(skip_all, fields(tool = "get_confluence_page_comments"))]
pub async fn get_confluence_page_comments(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    let comments = ctx
        .client
        .get(
            &format!("{}/child/comment", content_path(&params.page_id)),
            &[("expand", "body.storage,version".to_string())],
        )
        .await?;
    Ok(ToolResult::success(comments))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCommentParams {
    pub comment_id: String,
    pub comment: String,
}

impl UpdateCommentParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            comment_id: args.require_string("comment_id")?,
            comment: args.require_string("comment")?,
        })
    }
}

/// Replace a comment body. Reads the current version and writes version + 1.
#[instrument(skip_all, fields(tool = "update_confluence_comment"))]
pub async fn update_confluence_comment(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = UpdateCommentParams::from_args(&args)?;
    let path = content_path(&params.comment_id);

    let current = ctx
        .client
        .get(&path, &[("expand", "space,version".to_string())])
        .await?;
    let space_key = space_key_of(&current)
        .ok_or_else(|| ToolError::internal("Could not determine space from comment"))?;
    let current_version = current
        .pointer("/version/number")
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::internal("Could not determine version from comment"))?;

    let updated = ctx
        .client
        .put(
            &path,
            &json!({
                "id": params.comment_id,
                "type": "comment",
                "space": { "key": space_key },
                "version": { "number": current_version + 1 },
                "body": storage_body(&params.comment)
            }),
        )
        .await?;

    Ok(ToolResult::success(json!({
        "id": field(&updated, "/id"),
        "comment_id": params.comment_id,
        "comment": params.comment,
        "version": field(&updated, "/version/number"),
        "url": field(&updated, "/_links/webui")
    })))
}

#[instrument(skip_all, fields(tool = "delete_confluence_comment"))]
pub async fn delete_confluence_comment(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let comment_id = args.require_string("comment_id")?;
    ctx.client.delete(&content_path(&comment_id), &[]).await?;
    Ok(ToolResult::text(format!(
        "Deleted Confluence comment: {}",
        comment_id
    )))
}
