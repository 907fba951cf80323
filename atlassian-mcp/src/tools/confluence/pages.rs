//! Page tools: read, create, update, delete, hierarchy, history and labels.

use super::{content_path, storage_body, PageParams};
use crate::error::ToolCallResult;
use crate::tools::{field, ToolContext};
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

/// Expansion used when reading a page with its body.
pub const PAGE_EXPAND: &str = "body.storage,version,space";

/// Fetch a page with body, version and space.
#[instrument(skip_all, fields(tool = "get_confluence_page"))]
pub async fn get_confluence_page(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    let page = ctx
        .client
        .get(
            &content_path(&params.page_id),
            &[("expand", PAGE_EXPAND.to_string())],
        )
        .await?;
    Ok(ToolResult::success(page))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePageParams {
    pub space_key: String,
    pub title: String,
    /// Storage-format body; empty when not given.
    pub content: String,
    pub parent_id: Option<String>,
}

impl CreatePageParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            space_key: args.require_string("space_key")?,
            title: args.require_string("title")?,
            content: args.optional_string("content").unwrap_or_default(),
            parent_id: args.optional_string("parent_id"),
        })
    }

    pub fn payload(&self) -> Value {
        let mut payload = json!({
            "type": "page",
            "title": self.title,
            "space": { "key": self.space_key },
            "body": storage_body(&self.content)
        });
        if let Some(parent_id) = &self.parent_id {
            payload["ancestors"] = json!([{ "id": parent_id }]);
        }
        payload
    }
}

/// Create a page, optionally under a parent page.
#[instrument(skip_all, fields(tool = "create_confluence_page"))]
pub async fn create_confluence_page(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = CreatePageParams::from_args(&args)?;
    let page = ctx
        .client
        .post("/wiki/rest/api/content", &params.payload())
        .await?;

    Ok(ToolResult::success(json!({
        "id": field(&page, "/id"),
        "title": field(&page, "/title"),
        "space": field(&page, "/space/key"),
        "url": field(&page, "/_links/webui")
    })))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePageParams {
    pub page_id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    /// Explicit version number; defaults to current + 1.
    pub version: Option<i64>,
}

impl UpdatePageParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            page_id: args.require_string("page_id")?,
            title: args.optional_string("title"),
            content: args.optional_string("content"),
            version: args
                .contains("version")
                .then(|| args.number_or("version", 0))
                .filter(|v| *v > 0),
        })
    }

    /// Build the PUT body from the current page and the supplied changes.
    ///
    /// Title and body missing from the arguments are taken from `current`.
    pub fn payload(&self, current: &Value) -> Value {
        let current_version = current
            .pointer("/version/number")
            .and_then(Value::as_i64)
            .filter(|n| *n > 0)
            .unwrap_or(1);
        let version = self.version.unwrap_or(current_version + 1);

        let space = match current.pointer("/space/key") {
            Some(key) => json!({ "key": key }),
            None => field(current, "/space"),
        };

        let mut payload = Map::new();
        payload.insert("id".into(), json!(self.page_id));
        payload.insert(
            "type".into(),
            current
                .get("type")
                .filter(|t| t.as_str().map_or(false, |s| !s.is_empty()))
                .cloned()
                .unwrap_or_else(|| json!("page")),
        );
        payload.insert("space".into(), space);
        payload.insert("version".into(), json!({ "number": version }));
        payload.insert(
            "title".into(),
            match &self.title {
                Some(title) => json!(title),
                None => field(current, "/title"),
            },
        );
        payload.insert(
            "body".into(),
            match &self.content {
                Some(content) => storage_body(content),
                None => field(current, "/body"),
            },
        );
        Value::Object(payload)
    }
}

/// Update a page. Reads the current version first and writes version + 1.
///
/// No conflict detection: if the page moved on in between, the PUT fails
/// with whatever error Confluence returns.
#[instrument(skip_all, fields(tool = "update_confluence_page"))]
pub async fn update_confluence_page(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = UpdatePageParams::from_args(&args)?;
    let path = content_path(&params.page_id);

    let current = ctx
        .client
        .get(&path, &[("expand", "version,space,body.storage".to_string())])
        .await?;
    let payload = params.payload(&current);
    debug!("Updating page {} to version {}", params.page_id, payload["version"]["number"]);

    ctx.client.put(&path, &payload).await?;
    Ok(ToolResult::text(format!(
        "Updated Confluence page: {}",
        params.page_id
    )))
}

#[instrument(skip_all, fields(tool = "delete_confluence_page"))]
pub async fn delete_confluence_page(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    ctx.client.delete(&content_path(&params.page_id), &[]).await?;
    Ok(ToolResult::text(format!(
        "Deleted Confluence page: {}",
        params.page_id
    )))
}

#[instrument(skip_all, fields(tool = "get_confluence_page_history"))]
pub async fn get_confluence_page_history(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    let page = ctx
        .client
        .get(
            &content_path(&params.page_id),
            &[("expand", "history,version".to_string())],
        )
        .await?;

    Ok(ToolResult::success(json!({
        "id": field(&page, "/id"),
        "title": field(&page, "/title"),
        "current_version": field(&page, "/version"),
        "history": field(&page, "/history")
    })))
}

/// Direct child pages.
#[instrument(skip_all, fields(tool = "get_confluence_page_children"))]
pub async fn get_confluence_page_children(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    let limit = args.number_or("limit", 25);

    let children = ctx
        .client
        .get(
            &format!("{}/child/page", content_path(&params.page_id)),
            &[
                ("limit", limit.to_string()),
                ("expand", "space,version".to_string()),
            ],
        )
        .await?;
    Ok(ToolResult::success(children))
}

/// Parent chain from the space root down to the page.
#[instrument(skip_all, fields(tool = "get_confluence_page_ancestors"))]
pub async fn get_confluence_page_ancestors(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    let page = ctx
        .client
        .get(
            &content_path(&params.page_id),
            &[("expand", "ancestors".to_string())],
        )
        .await?;

    let ancestors = page
        .get("ancestors")
        .filter(|a| !a.is_null())
        .cloned()
        .unwrap_or_else(|| json!([]));
    Ok(ToolResult::success(json!({
        "id": field(&page, "/id"),
        "title": field(&page, "/title"),
        "ancestors": ancestors
    })))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLabelParams {
    pub page_id: String,
    pub label: String,
}

impl PageLabelParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            page_id: args.require_string("page_id")?,
            label: args.require_string("label")?,
        })
    }
}

/// Add a global label.
#[instrument(skip_all, fields(tool = "add_label_to_confluence_page"))]
pub async fn add_label_to_confluence_page(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageLabelParams::from_args(&args)?;
    ctx.client
        .post(
            &format!("{}/label", content_path(&params.page_id)),
            &json!([{ "prefix": "global", "name": params.label }]),
        )
        .await?;

    Ok(ToolResult::success(json!({
        "page_id": params.page_id,
        "label": params.label,
        "added": true
    })))
}

/// Remove a label. The label is percent-encoded into the path.
#[instrument(skip_all, fields(tool = "remove_label_from_confluence_page"))]
pub async fn remove_label_from_confluence_page(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageLabelParams::from_args(&args)?;
    let path = format!(
        "{}/label/{}",
        content_path(&params.page_id),
        urlencoding::encode(&params.label)
    );

    ctx.client.delete(&path, &[]).await?;
    Ok(ToolResult::text(format!(
        "Removed label \"{}\" from Confluence page: {}",
        params.label, params.page_id
    )))
}

#[instrument(skip_all, fields(tool = "get_confluence_page_labels"))]
pub async fn get_confluence_page_labels(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = PageParams::from_args(&args)?;
    let labels = ctx
        .client
        .get(&format!("{}/label", content_path(&params.page_id)), &[])
        .await?;
    Ok(ToolResult::success(labels))
}
