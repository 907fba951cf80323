//! Page attachment tools.

use super::{content_path, PageParams};
use crate::clients::atlassian::CONFLUENCE_XSRF_TOKEN;
use crate::error::{ToolCallResult, ToolError};
use crate::tools::{field, file_part, ToolContext};
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use reqwest::multipart::Form;
use serde_json::{json, Value};
use tracing::instrument;

fn attachments_path(page_id: &str) -> String {
    format!("{}/child/attachment", content_path(page_id))
}

#[instrument(skip_all, fields(tool = "get_confluence_page_attachments"))]
pub async fn get_confluence_page_attachments(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    let attachments = ctx
        .client
        .get(
            &attachments_path(&params.page_id),
            &[("expand", "version,container".to_string())],
        )
        .await?;
    Ok(ToolResult::success(attachments))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadParams {
    pub page_id: String,
    pub file_path: String,
    pub comment: Option<String>,
}

impl UploadParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            page_id: args.require_string("page_id")?,
            file_path: args.require_string("file_path")?,
            comment: args.optional_string("comment"),
        })
    }
}

/// Upload a local file to a page.
#[instrument(skip_all, fields(tool = "upload_attachment_to_confluence_page"))]
pub async fn upload_attachment_to_confluence_page(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = UploadParams::from_args(&args)?;

    let mut form = Form::new().part("file", file_part(&params.file_path, None).await?);
    if let Some(comment) = params.comment {
        form = form.text("comment", comment);
    }

    let uploaded = ctx
        .client
        .post_multipart(&attachments_path(&params.page_id), form, CONFLUENCE_XSRF_TOKEN)
        .await?;
    let first = field(&uploaded, "/results/0");

    Ok(ToolResult::success(json!({
        "id": field(&first, "/id"),
        "filename": field(&first, "/title"),
        "page_id": params.page_id,
        "url": field(&first, "/_links/webui")
    })))
}

/// Which attachment to describe.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentLookup {
    ById(String),
    ByName { page_id: String, filename: String },
}

impl AttachmentLookup {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        if let Some(id) = args.optional_string("attachment_id") {
            return Ok(AttachmentLookup::ById(id));
        }
        match (args.optional_string("page_id"), args.optional_string("filename")) {
            (Some(page_id), Some(filename)) => Ok(AttachmentLookup::ByName { page_id, filename }),
            _ => Err(ToolError::invalid_params(
                "Either attachment_id or (page_id and filename) is required",
            )),
        }
    }
}

fn download_info(attachment: &Value) -> Value {
    json!({
        "id": field(attachment, "/id"),
        "filename": field(attachment, "/title"),
        "download_url": field(attachment, "/_links/download"),
        "webui_url": field(attachment, "/_links/webui"),
        "media_type": field(attachment, "/extensions/mediaType"),
        "file_size": field(attachment, "/extensions/fileSize")
    })
}

/// Download link and metadata for an attachment, by id or by page and name.
#[instrument(skip_all, fields(tool = "download_confluence_attachment"))]
pub async fn download_confluence_attachment(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let attachment = match AttachmentLookup::from_args(&args)? {
        AttachmentLookup::ById(id) => {
            ctx.client
                .get(&content_path(&id), &[("expand", "download".to_string())])
                .await?
        }
        AttachmentLookup::ByName { page_id, filename } => {
            let listing = ctx
                .client
                .get(
                    &attachments_path(&page_id),
                    &[
                        ("filename", filename.clone()),
                        ("expand", "download".to_string()),
                    ],
                )
                .await?;
            listing
                .pointer("/results/0")
                .cloned()
                .ok_or_else(|| {
                    ToolError::invalid_params(format!(
                        "Attachment \"{}\" not found on page {}",
                        filename, page_id
                    ))
                })?
        }
    };
    Ok(ToolResult::success(download_info(&attachment)))
}
