//! Space listing and CQL search tools.

use crate::error::{ToolCallResult, ToolError};
use crate::query::{build_label_search_cql, build_text_search_cql};
use crate::tools::ToolContext;
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use std::time::Duration;
use tracing::{debug, instrument};

/// Cache lifetime for the full space listing.
pub const SPACES_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key for the full space listing.
pub const SPACES_CACHE_KEY: &str = "confluence:spaces:all";

const SEARCH_PATH: &str = "/wiki/rest/api/content/search";

async fn run_cql(
    ctx: &ToolContext,
    cql: String,
    limit: i64,
    expand: &str,
) -> ToolCallResult<ToolResult> {
    debug!("Searching Confluence with CQL: {}", cql);
    let results = ctx
        .client
        .get(
            SEARCH_PATH,
            &[
                ("cql", cql),
                ("limit", limit.to_string()),
                ("expand", expand.to_string()),
            ],
        )
        .await?;
    Ok(ToolResult::success(results))
}

/// Full-text search across all spaces.
#[instrument(skip_all, fields(tool = "search_confluence"))]
pub async fn search_confluence(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let query = args.require_string("query")?;
    let limit = args.number_or("limit", 10);
    run_cql(&ctx, build_text_search_cql(&query, None), limit, "space").await
}

/// Full-text search within one space.
#[instrument(skip_all, fields(tool = "search_confluence_by_space"))]
pub async fn search_confluence_by_space(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let space_key = args.require_string("space_key")?;
    let query = args.require_string("query")?;
    let limit = args.number_or("limit", 10);
    run_cql(
        &ctx,
        build_text_search_cql(&query, Some(&space_key)),
        limit,
        "space,version",
    )
    .await
}

/// Content carrying a label.
#[instrument(skip_all, fields(tool = "search_confluence_by_label"))]
pub async fn search_confluence_by_label(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let label = args.require_string("label")?;
    let limit = args.number_or("limit", 10);
    run_cql(&ctx, build_label_search_cql(&label), limit, "space,version").await
}

/// List the named spaces, or all spaces from the cache.
#[instrument(skip_all, fields(tool = "get_confluence_spaces"))]
pub async fn get_confluence_spaces(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let keys = args
        .optional_array("space_keys")
        .filter(|keys| !keys.is_empty());

    let spaces = match keys {
        Some(keys) => {
            ctx.client
                .get(
                    "/wiki/rest/api/space",
                    &[("keys", keys.join(",")), ("limit", "100".to_string())],
                )
                .await?
        }
        None => {
            let client = &ctx.client;
            ctx.cache
                .get_or_fetch(SPACES_CACHE_KEY, SPACES_CACHE_TTL, || async {
                    client
                        .get("/wiki/rest/api/space", &[("limit", "100".to_string())])
                        .await
                })
                .await
                .map_err(ToolError::from)?
        }
    };
    Ok(ToolResult::success(spaces))
}

/// Space details with homepage, labels and description.
#[instrument(skip_all, fields(tool = "get_confluence_space"))]
pub async fn get_confluence_space(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let space_key = args.require_string("space_key")?;
    let space = ctx
        .client
        .get(
            &format!("/wiki/rest/api/space/{}", space_key),
            &[("expand", "homepage,metadata.labels,description".to_string())],
        )
        .await?;
    Ok(ToolResult::success(space))
}

#[instrument(skip_all, fields(tool = "get_confluence_space_content"))]
pub async fn get_confluence_space_content(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let space_key = args.require_string("space_key")?;
    let limit = args.number_or("limit", 100);

    let content = ctx
        .client
        .get(
            "/wiki/rest/api/content",
            &[
                ("spaceKey", space_key),
                ("expand", "space,version,ancestors".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;
    Ok(ToolResult::success(content))
}
