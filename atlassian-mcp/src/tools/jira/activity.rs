//! Ticket activity tools: comments, worklogs, watchers and attachments.

use super::{issue_path, TicketParams};
use crate::adf::adf_document;
use crate::clients::atlassian::JIRA_XSRF_TOKEN;
use crate::error::{ToolCallResult, ToolError};
use crate::tools::users::{lookup_user_by_email, lookup_user_by_username};
use crate::tools::{field, file_part, ToolContext};
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use reqwest::multipart::Form;
use serde_json::{json, Map, Value};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq)]
pub struct CommentParams {
    pub ticket_key: String,
    pub comment: String,
}

impl CommentParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            ticket_key: args.require_string("ticket_key")?,
            comment: args.require_string("comment")?,
        })
    }
}

/// Add a comment to a ticket.
#[instrument(skip_all, fields(tool = "add_comment_to_jira_ticket"))]
pub async fn add_comment_to_jira_ticket(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = CommentParams::from_args(&args)?;
    ctx.client
        .post(
            &format!("{}/comment", issue_path(&params.ticket_key)),
            &json!({ "body": adf_document(&params.comment) }),
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Added comment to {}",
        params.ticket_key
    )))
}

#[instrument(skip_all, fields(tool = "get_jira_ticket_comments"))]
pub async fn get_jira_ticket_comments(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = TicketParams::from_args(&args)?;
    let comments = ctx
        .client
        .get(&format!("{}/comment", issue_path(&params.ticket_key)), &[])
        .await?;
    Ok(ToolResult::success(comments))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRef {
    pub ticket_key: String,
    pub comment_id: String,
}

impl CommentRef {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            ticket_key: args.require_string("ticket_key")?,
            comment_id: args.require_string("comment_id")?,
        })
    }

    fn path(&self) -> String {
        format!("{}/comment/{}", issue_path(&self.ticket_key), self.comment_id)
    }
}

/// Replace the body of an existing comment.
#[instrument(skip_all, fields(tool = "update_jira_comment"))]
pub async fn update_jira_comment(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let target = CommentRef::from_args(&args)?;
    let comment = args.require_string("comment")?;

    ctx.client
        .put(&target.path(), &json!({ "body": adf_document(&comment) }))
        .await?;
    Ok(ToolResult::text(format!(
        "Updated comment {} on JIRA ticket: {}",
        target.comment_id, target.ticket_key
    )))
}

#[instrument(skip_all, fields(tool = "delete_jira_comment"))]
pub async fn delete_jira_comment(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let target = CommentRef::from_args(&args)?;
    ctx.client.delete(&target.path(), &[]).await?;
    Ok(ToolResult::text(format!(
        "Deleted comment {} from JIRA ticket: {}",
        target.comment_id, target.ticket_key
    )))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentParams {
    pub ticket_key: String,
    pub file_path: String,
    pub filename: Option<String>,
}

impl AttachmentParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            ticket_key: args.require_string("ticket_key")?,
            file_path: args.require_string("file_path")?,
            filename: args.optional_string("filename"),
        })
    }
}

/// Upload a local file as a ticket attachment.
#[instrument(skip_all, fields(tool = "add_attachment_to_jira_ticket"))]
pub async fn add_attachment_to_jira_ticket(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = AttachmentParams::from_args(&args)?;
    let part = file_part(&params.file_path, params.filename).await?;

    let attachments = ctx
        .client
        .post_multipart(
            &format!("{}/attachments", issue_path(&params.ticket_key)),
            Form::new().part("file", part),
            JIRA_XSRF_TOKEN,
        )
        .await?;

    Ok(ToolResult::success(json!({
        "ticket_key": params.ticket_key,
        "attachments": attachments,
        "message": format!("Successfully attached file to ticket {}", params.ticket_key)
    })))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddWorklogParams {
    pub ticket_key: String,
    /// Jira duration, e.g. "3h 20m".
    pub time_spent: String,
    /// Start timestamp, e.g. "2024-01-15T09:00:00.000+0000".
    pub started: String,
    pub comment: Option<String>,
}

impl AddWorklogParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            ticket_key: args.require_string("ticket_key")?,
            time_spent: args.require_string("time_spent")?,
            started: args.require_string("started")?,
            comment: args.optional_string("comment"),
        })
    }
}

/// Log time against a ticket.
#[instrument(skip_all, fields(tool = "add_worklog_to_jira_ticket"))]
pub async fn add_worklog_to_jira_ticket(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = AddWorklogParams::from_args(&args)?;

    let mut payload = Map::new();
    payload.insert("timeSpent".into(), json!(params.time_spent));
    payload.insert("started".into(), json!(params.started));
    if let Some(comment) = &params.comment {
        payload.insert("comment".into(), adf_document(comment));
    }

    let worklog = ctx
        .client
        .post(
            &format!("{}/worklog", issue_path(&params.ticket_key)),
            &Value::Object(payload),
        )
        .await?;

    Ok(ToolResult::success(json!({
        "id": field(&worklog, "/id"),
        "ticket_key": params.ticket_key,
        "timeSpent": field(&worklog, "/timeSpent"),
        "timeSpentSeconds": field(&worklog, "/timeSpentSeconds"),
        "started": field(&worklog, "/started"),
        "comment": field(&worklog, "/comment"),
        "author": field(&worklog, "/author")
    })))
}

#[instrument(skip_all, fields(tool = "get_jira_ticket_worklogs"))]
pub async fn get_jira_ticket_worklogs(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = TicketParams::from_args(&args)?;
    let worklogs = ctx
        .client
        .get(&format!("{}/worklog", issue_path(&params.ticket_key)), &[])
        .await?;
    Ok(ToolResult::success(worklogs))
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorklogRef {
    pub ticket_key: String,
    pub worklog_id: String,
}

impl WorklogRef {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            ticket_key: args.require_string("ticket_key")?,
            worklog_id: args.require_string("worklog_id")?,
        })
    }

    fn path(&self) -> String {
        format!("{}/worklog/{}", issue_path(&self.ticket_key), self.worklog_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateWorklogParams {
    pub target: WorklogRef,
    pub time_spent: Option<String>,
    pub started: Option<String>,
    pub comment: Option<String>,
}

impl UpdateWorklogParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        let target = WorklogRef::from_args(args)?;
        args.require_at_least_one(&["time_spent", "started", "comment"])?;
        Ok(Self {
            target,
            time_spent: args.optional_string("time_spent"),
            started: args.optional_string("started"),
            comment: args.optional_string("comment"),
        })
    }

    pub fn payload(&self) -> Value {
        let mut payload = Map::new();
        if let Some(time_spent) = &self.time_spent {
            payload.insert("timeSpent".into(), json!(time_spent));
        }
        if let Some(started) = &self.started {
            payload.insert("started".into(), json!(started));
        }
        if let Some(comment) = &self.comment {
            payload.insert("comment".into(), adf_document(comment));
        }
        Value::Object(payload)
    }
}

#[instrument(skip_all, fields(tool = "update_jira_worklog"))]
pub async fn update_jira_worklog(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = UpdateWorklogParams::from_args(&args)?;
    ctx.client
        .put(&params.target.path(), &params.payload())
        .await?;
    Ok(ToolResult::text(format!(
        "Updated worklog {} on JIRA ticket: {}",
        params.target.worklog_id, params.target.ticket_key
    )))
}

#[instrument(skip_all, fields(tool = "delete_jira_worklog"))]
pub async fn delete_jira_worklog(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let target = WorklogRef::from_args(&args)?;
    ctx.client.delete(&target.path(), &[]).await?;
    Ok(ToolResult::text(format!(
        "Deleted worklog {} from JIRA ticket: {}",
        target.worklog_id, target.ticket_key
    )))
}

/// A watcher given directly or through a lookup key.
#[derive(Debug, Clone, PartialEq)]
pub enum WatcherRef {
    AccountId(String),
    Email(String),
    Username(String),
}

impl WatcherRef {
    async fn account_id(self, ctx: &ToolContext) -> ToolCallResult<String> {
        match self {
            WatcherRef::AccountId(id) => Ok(id),
            WatcherRef::Email(email) => lookup_user_by_email(&ctx.client, &email).await,
            WatcherRef::Username(name) => lookup_user_by_username(&ctx.client, &name).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatcherParams {
    pub ticket_key: String,
    pub watcher: WatcherRef,
}

impl WatcherParams {
    /// `account_id` or `email`; used when adding a watcher.
    pub fn for_add(args: &ToolArgs) -> ToolCallResult<Self> {
        let ticket_key = args.require_string("ticket_key")?;
        let watcher = match (args.optional_string("account_id"), args.optional_string("email")) {
            (Some(id), _) => WatcherRef::AccountId(id),
            (None, Some(email)) => WatcherRef::Email(email),
            (None, None) => {
                return Err(ToolError::invalid_params(
                    "Either account_id or email is required",
                ))
            }
        };
        Ok(Self {
            ticket_key,
            watcher,
        })
    }

    /// `account_id` or `username`; used when removing a watcher.
    pub fn for_remove(args: &ToolArgs) -> ToolCallResult<Self> {
        let ticket_key = args.require_string("ticket_key")?;
        let watcher = match (
            args.optional_string("account_id"),
            args.optional_string("username"),
        ) {
            (Some(id), _) => WatcherRef::AccountId(id),
            (None, Some(username)) => WatcherRef::Username(username),
            (None, None) => {
                return Err(ToolError::invalid_params(
                    "Either username or account_id is required",
                ))
            }
        };
        Ok(Self {
            ticket_key,
            watcher,
        })
    }
}

/// Add a watcher. The body is the bare account id as a JSON string.
#[instrument(skip_all, fields(tool = "add_watcher_to_jira_ticket"))]
pub async fn add_watcher_to_jira_ticket(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = WatcherParams::for_add(&args)?;
    let account_id = params.watcher.account_id(&ctx).await?;

    ctx.client
        .post(
            &format!("{}/watchers", issue_path(&params.ticket_key)),
            &Value::String(account_id.clone()),
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Added watcher (accountId: {}) to JIRA ticket: {}",
        account_id, params.ticket_key
    )))
}

#[instrument(skip_all, fields(tool = "remove_watcher_from_jira_ticket"))]
pub async fn remove_watcher_from_jira_ticket(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = WatcherParams::for_remove(&args)?;
    let account_id = params.watcher.account_id(&ctx).await?;

    ctx.client
        .delete(
            &format!("{}/watchers", issue_path(&params.ticket_key)),
            &[("accountId", account_id.clone())],
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Removed watcher (accountId: {}) from JIRA ticket: {}",
        account_id, params.ticket_key
    )))
}

#[instrument(skip_all, fields(tool = "get_jira_ticket_watchers"))]
pub async fn get_jira_ticket_watchers(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = TicketParams::from_args(&args)?;
    let watchers = ctx
        .client
        .get(&format!("{}/watchers", issue_path(&params.ticket_key)), &[])
        .await?;
    Ok(ToolResult::success(watchers))
}
