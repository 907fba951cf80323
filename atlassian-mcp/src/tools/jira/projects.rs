//! Project metadata tools.
//!
//! Global issue types and priorities change rarely and are served from the
//! shared cache for ten minutes.

use super::ProjectParams;
use crate::error::{ToolCallResult, ToolError};
use crate::tools::ToolContext;
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

/// Cache lifetime for issue types and priorities.
pub const METADATA_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Cache key for the global issue type listing.
pub const ISSUE_TYPES_CACHE_KEY: &str = "jira:issueTypes:global";

/// Cache key for the priority listing.
pub const PRIORITIES_CACHE_KEY: &str = "jira:priorities";

const PROJECT_EXPAND: &str = "description,lead,issueTypes,url,projectKeys,components,projectCategory";

fn project_path(project: &str) -> String {
    format!("/rest/api/3/project/{}", project)
}

/// List projects, either the named ones or the first hundred visible.
#[instrument(skip_all, fields(tool = "get_jira_projects"))]
pub async fn get_jira_projects(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let keys = args
        .optional_array("project_keys")
        .filter(|keys| !keys.is_empty());

    let projects = match keys {
        Some(keys) => {
            ctx.client
                .get("/rest/api/3/project", &[("keys", keys.join(","))])
                .await?
        }
        None => {
            ctx.client
                .get("/rest/api/3/project/search", &[("maxResults", "100".to_string())])
                .await?
        }
    };
    Ok(ToolResult::success(projects))
}

/// Project details with lead, issue types, components and category.
#[instrument(skip_all, fields(tool = "get_jira_project"))]
pub async fn get_jira_project(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = ProjectParams::from_args(&args)?;
    let project = ctx
        .client
        .get(
            &project_path(&params.project),
            &[("expand", PROJECT_EXPAND.to_string())],
        )
        .await?;
    Ok(ToolResult::success(project))
}

#[instrument(skip_all, fields(tool = "get_jira_components"))]
pub async fn get_jira_components(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = ProjectParams::from_args(&args)?;
    let components = ctx
        .client
        .get(&format!("{}/components", project_path(&params.project)), &[])
        .await?;
    Ok(ToolResult::success(components))
}

/// Issue types for one project, or the cached global listing.
#[instrument(skip_all, fields(tool = "get_jira_issue_types"))]
pub async fn get_jira_issue_types(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let project = args
        .optional_string("project_key")
        .or_else(|| args.optional_string("project_id"));

    let issue_types = match project {
        Some(project) => {
            let details = ctx
                .client
                .get(&project_path(&project), &[("expand", "issueTypes".to_string())])
                .await?;
            details
                .get("issueTypes")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()))
        }
        None => {
            let client = &ctx.client;
            ctx.cache
                .get_or_fetch(ISSUE_TYPES_CACHE_KEY, METADATA_CACHE_TTL, || async {
                    client.get("/rest/api/3/issuetype", &[]).await
                })
                .await
                .map_err(ToolError::from)?
        }
    };
    Ok(ToolResult::success(issue_types))
}

#[instrument(skip_all, fields(tool = "get_jira_priorities"))]
pub async fn get_jira_priorities(_args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let client = &ctx.client;
    let priorities = ctx
        .cache
        .get_or_fetch(PRIORITIES_CACHE_KEY, METADATA_CACHE_TTL, || async {
            client.get("/rest/api/3/priority", &[]).await
        })
        .await
        .map_err(ToolError::from)?;
    Ok(ToolResult::success(priorities))
}

/// Statuses grouped by issue type for a project.
#[instrument(skip_all, fields(tool = "get_jira_statuses"))]
pub async fn get_jira_statuses(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = ProjectParams::from_args(&args)?;
    let statuses = ctx
        .client
        .get(&format!("{}/statuses", project_path(&params.project)), &[])
        .await?;
    Ok(ToolResult::success(statuses))
}
