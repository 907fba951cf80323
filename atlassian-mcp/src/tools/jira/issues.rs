//! Issue tools: read, search, create, update, delete, workflow transitions,
//! assignment, links and labels.

use super::{issue_path, TicketParams, SEARCH_FIELDS, TICKET_FIELDS};
use crate::adf::adf_document;
use crate::error::{ToolCallResult, ToolError};
use crate::query::validate_and_fix_jql;
use crate::tools::users::resolve_user_to_account_id;
use crate::tools::ToolContext;
use crate::types::ToolResult;
use crate::validation::ToolArgs;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

/// Issue type used when `create_jira_ticket` gets none.
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// Link type used when `link_jira_tickets` gets none.
pub const DEFAULT_LINK_TYPE: &str = "Relates";

/// Fetch a single ticket with the standard field list.
#[instrument(skip_all, fields(tool = "get_jira_ticket"))]
pub async fn get_jira_ticket(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = TicketParams::from_args(&args)?;
    let issue = ctx
        .client
        .get(
            &issue_path(&params.ticket_key),
            &[("fields", TICKET_FIELDS.to_string())],
        )
        .await?;
    Ok(ToolResult::success(issue))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub jql: String,
    pub max_results: i64,
}

impl SearchParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            jql: validate_and_fix_jql(&args.require_string("jql")?),
            max_results: args.number_or("max_results", 10),
        })
    }
}

/// Run a JQL search.
#[instrument(skip_all, fields(tool = "search_jira_tickets"))]
pub async fn search_jira_tickets(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = SearchParams::from_args(&args)?;
    debug!("Searching JIRA with JQL: {}", params.jql);

    let results = ctx
        .client
        .get(
            "/rest/api/3/search/jql",
            &[
                ("jql", params.jql),
                ("maxResults", params.max_results.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ],
        )
        .await?;
    Ok(ToolResult::success(results))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTicketParams {
    pub project_key: String,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
}

impl CreateTicketParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            project_key: args.require_string("project_key")?,
            summary: args.require_string("summary")?,
            description: args.require_string("description")?,
            issue_type: args
                .optional_string("issue_type")
                .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string()),
        })
    }
}

/// Create a ticket. The description is sent as a one-paragraph document.
#[instrument(skip_all, fields(tool = "create_jira_ticket"))]
pub async fn create_jira_ticket(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = CreateTicketParams::from_args(&args)?;

    let created = ctx
        .client
        .post(
            "/rest/api/3/issue",
            &json!({
                "fields": {
                    "project": { "key": params.project_key },
                    "summary": params.summary,
                    "description": adf_document(&params.description),
                    "issuetype": { "name": params.issue_type }
                }
            }),
        )
        .await?;

    let key = created.get("key").and_then(Value::as_str).unwrap_or_default();
    Ok(ToolResult::text(format!("Created JIRA ticket: {}", key)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTicketParams {
    pub ticket_key: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub labels: Option<Vec<String>>,
}

impl UpdateTicketParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        let ticket_key = args.require_string("ticket_key")?;
        args.require_at_least_one(&["summary", "description", "priority", "labels"])?;

        Ok(Self {
            ticket_key,
            summary: args.present_string("summary"),
            description: args.present_string("description"),
            priority: args.present_string("priority"),
            labels: args.optional_array("labels"),
        })
    }

    /// The `fields` object holding only the supplied values.
    pub fn fields(&self) -> Value {
        let mut fields = Map::new();
        if let Some(summary) = &self.summary {
            fields.insert("summary".into(), json!(summary));
        }
        if let Some(description) = &self.description {
            fields.insert("description".into(), adf_document(description));
        }
        if let Some(priority) = &self.priority {
            fields.insert("priority".into(), json!({ "name": priority }));
        }
        if let Some(labels) = &self.labels {
            fields.insert("labels".into(), json!(labels));
        }
        Value::Object(fields)
    }
}

/// Update summary, description, priority or labels.
#[instrument(skip_all, fields(tool = "update_jira_ticket"))]
pub async fn update_jira_ticket(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = UpdateTicketParams::from_args(&args)?;
    ctx.client
        .put(
            &issue_path(&params.ticket_key),
            &json!({ "fields": params.fields() }),
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Updated JIRA ticket: {}",
        params.ticket_key
    )))
}

/// Delete a ticket, optionally with its subtasks.
#[instrument(skip_all, fields(tool = "delete_jira_ticket"))]
pub async fn delete_jira_ticket(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = TicketParams::from_args(&args)?;
    let delete_subtasks = args.bool_or("delete_subtasks", false);

    ctx.client
        .delete(
            &issue_path(&params.ticket_key),
            &[("deleteSubtasks", delete_subtasks.to_string())],
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Deleted JIRA ticket: {}",
        params.ticket_key
    )))
}

/// How the target transition is identified.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionTarget {
    Id(String),
    /// Matched case-insensitively against the available transitions.
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionParams {
    pub ticket_key: String,
    pub target: TransitionTarget,
}

impl TransitionParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        let ticket_key = args.require_string("ticket_key")?;
        let target = match (
            args.optional_string("transition_id"),
            args.optional_string("transition_name"),
        ) {
            (Some(id), _) => TransitionTarget::Id(id),
            (None, Some(name)) => TransitionTarget::Name(name),
            (None, None) => {
                return Err(ToolError::invalid_params(
                    "Either transition_id or transition_name is required",
                ))
            }
        };
        Ok(Self { ticket_key, target })
    }
}

/// Pick the id of the transition called `name` from a transitions listing.
fn find_transition_id(transitions: &Value, name: &str) -> ToolCallResult<String> {
    let available: Vec<&Value> = transitions
        .get("transitions")
        .and_then(Value::as_array)
        .map(|list| list.iter().collect())
        .unwrap_or_default();

    let wanted = name.to_lowercase();
    let matched = available.iter().find(|t| {
        t.get("name")
            .and_then(Value::as_str)
            .map_or(false, |n| n.to_lowercase() == wanted)
    });

    match matched {
        Some(transition) => Ok(match transition.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }),
        None => {
            let names: Vec<&str> = available
                .iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str))
                .collect();
            let listed = if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            };
            Err(ToolError::invalid_params(format!(
                "Transition \"{}\" not found. Available: {}",
                name, listed
            )))
        }
    }
}

/// Move a ticket through its workflow by transition id or name.
#[instrument(skip_all, fields(tool = "transition_jira_ticket"))]
pub async fn transition_jira_ticket(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = TransitionParams::from_args(&args)?;
    let path = format!("{}/transitions", issue_path(&params.ticket_key));

    let transition_id = match params.target {
        TransitionTarget::Id(id) => id,
        TransitionTarget::Name(name) => {
            let available = ctx.client.get(&path, &[]).await?;
            find_transition_id(&available, &name)?
        }
    };

    ctx.client
        .post(&path, &json!({ "transition": { "id": transition_id } }))
        .await?;
    Ok(ToolResult::text(format!(
        "Transitioned JIRA ticket {} to new status",
        params.ticket_key
    )))
}

/// List the transitions currently available on a ticket.
#[instrument(skip_all, fields(tool = "get_jira_ticket_transitions"))]
pub async fn get_jira_ticket_transitions(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = TicketParams::from_args(&args)?;
    let transitions = ctx
        .client
        .get(&format!("{}/transitions", issue_path(&params.ticket_key)), &[])
        .await?;
    Ok(ToolResult::success(transitions))
}

/// Who a ticket should be assigned to.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignee {
    Unassigned,
    /// Email or account id.
    User(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignParams {
    pub ticket_key: String,
    pub assignee: Assignee,
}

impl AssignParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        let ticket_key = args.require_string("ticket_key")?;
        let raw = args.require_string("assignee")?;
        let assignee = if raw == "-1" || raw.eq_ignore_ascii_case("unassign") {
            Assignee::Unassigned
        } else {
            Assignee::User(raw)
        };
        Ok(Self {
            ticket_key,
            assignee,
        })
    }
}

/// Assign a ticket to a user, or clear the assignee with `-1`/`unassign`.
#[instrument(skip_all, fields(tool = "assign_jira_ticket"))]
pub async fn assign_jira_ticket(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = AssignParams::from_args(&args)?;
    let path = format!("{}/assignee", issue_path(&params.ticket_key));

    match params.assignee {
        Assignee::Unassigned => {
            ctx.client.put(&path, &Value::Null).await?;
            Ok(ToolResult::text(format!(
                "Unassigned JIRA ticket {}",
                params.ticket_key
            )))
        }
        Assignee::User(identifier) => {
            let account_id = resolve_user_to_account_id(&ctx.client, &identifier).await?;
            ctx.client
                .put(&path, &json!({ "accountId": account_id }))
                .await?;
            Ok(ToolResult::text(format!(
                "Assigned JIRA ticket {}",
                params.ticket_key
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkParams {
    pub outward_issue_key: String,
    pub inward_issue_key: String,
    pub link_type: String,
}

impl LinkParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            outward_issue_key: args.require_string("outward_issue_key")?,
            inward_issue_key: args.require_string("inward_issue_key")?,
            link_type: args
                .optional_string("link_type")
                .unwrap_or_else(|| DEFAULT_LINK_TYPE.to_string()),
        })
    }
}

/// Link two tickets.
#[instrument(skip_all, fields(tool = "link_jira_tickets"))]
pub async fn link_jira_tickets(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = LinkParams::from_args(&args)?;
    ctx.client
        .post(
            "/rest/api/3/issueLink",
            &json!({
                "type": { "name": params.link_type },
                "outwardIssue": { "key": params.outward_issue_key },
                "inwardIssue": { "key": params.inward_issue_key }
            }),
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Linked JIRA tickets: {} {} {}",
        params.outward_issue_key, params.link_type, params.inward_issue_key
    )))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelParams {
    pub ticket_key: String,
    pub label: String,
}

impl LabelParams {
    pub fn from_args(args: &ToolArgs) -> ToolCallResult<Self> {
        Ok(Self {
            ticket_key: args.require_string("ticket_key")?,
            label: args.require_string("label")?,
        })
    }
}

/// Add one label, leaving existing labels alone.
#[instrument(skip_all, fields(tool = "add_label_to_jira_ticket"))]
pub async fn add_label_to_jira_ticket(args: ToolArgs, ctx: ToolContext) -> ToolCallResult<ToolResult> {
    let params = LabelParams::from_args(&args)?;
    ctx.client
        .put(
            &issue_path(&params.ticket_key),
            &json!({ "update": { "labels": [{ "add": params.label }] } }),
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Added label \"{}\" to JIRA ticket: {}",
        params.label, params.ticket_key
    )))
}

/// Remove one label.
#[instrument(skip_all, fields(tool = "remove_label_from_jira_ticket"))]
pub async fn remove_label_from_jira_ticket(
    args: ToolArgs,
    ctx: ToolContext,
) -> ToolCallResult<ToolResult> {
    let params = LabelParams::from_args(&args)?;
    ctx.client
        .put(
            &issue_path(&params.ticket_key),
            &json!({ "update": { "labels": [{ "remove": params.label }] } }),
        )
        .await?;
    Ok(ToolResult::text(format!(
        "Removed label \"{}\" from JIRA ticket: {}",
        params.label, params.ticket_key
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> ToolArgs {
        ToolArgs::new(value)
    }

    #[test]
    fn test_search_params_fix_order_by_only_jql() {
        let params = SearchParams::from_args(&args(json!({"jql": "ORDER BY created DESC"}))).unwrap();
        assert_eq!(params.jql, "updated >= -30d ORDER BY created DESC");
        assert_eq!(params.max_results, 10);
    }

    #[test]
    fn test_create_params_default_issue_type() {
        let params = CreateTicketParams::from_args(&args(json!({
            "project_key": "ENG",
            "summary": "Broken build",
            "description": "CI fails on main"
        })))
        .unwrap();
        assert_eq!(params.issue_type, "Task");

        let err = CreateTicketParams::from_args(&args(json!({"project_key": "ENG"}))).unwrap_err();
        assert_eq!(err.to_string(), "summary is required");
    }

    #[test]
    fn test_update_params_require_a_field() {
        let err = UpdateTicketParams::from_args(&args(json!({"ticket_key": "ENG-1"}))).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));

        let params = UpdateTicketParams::from_args(&args(json!({
            "ticket_key": "ENG-1",
            "priority": "High",
            "labels": "a, b"
        })))
        .unwrap();
        assert_eq!(
            params.fields(),
            json!({"priority": {"name": "High"}, "labels": ["a", "b"]})
        );
    }

    #[test]
    fn test_transition_params() {
        let params = TransitionParams::from_args(&args(json!({
            "ticket_key": "ENG-1",
            "transition_id": "31",
            "transition_name": "Done"
        })))
        .unwrap();
        assert_eq!(params.target, TransitionTarget::Id("31".to_string()));

        let err = TransitionParams::from_args(&args(json!({"ticket_key": "ENG-1"}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Either transition_id or transition_name is required"
        );
    }

    #[test]
    fn test_find_transition_id() {
        let listing = json!({"transitions": [
            {"id": "11", "name": "To Do"},
            {"id": "31", "name": "Done"}
        ]});
        assert_eq!(find_transition_id(&listing, "done").unwrap(), "31");

        let err = find_transition_id(&listing, "Blocked").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Transition \"Blocked\" not found. Available: To Do, Done"
        );

        let err = find_transition_id(&json!({}), "Done").unwrap_err();
        assert!(err.to_string().ends_with("Available: none"));
    }

    #[test]
    fn test_assign_params() {
        for raw in ["-1", "Unassign", "unassign"] {
            let params =
                AssignParams::from_args(&args(json!({"ticket_key": "A-1", "assignee": raw}))).unwrap();
            assert_eq!(params.assignee, Assignee::Unassigned);
        }

        let params =
            AssignParams::from_args(&args(json!({"ticket_key": "A-1", "assignee": "dev@acme.io"})))
                .unwrap();
        assert_eq!(params.assignee, Assignee::User("dev@acme.io".to_string()));
    }

    #[test]
    fn test_link_params_default_type() {
        let params = LinkParams::from_args(&args(json!({
            "outward_issue_key": "A-1",
            "inward_issue_key": "A-2"
        })))
        .unwrap();
        assert_eq!(params.link_type, "Relates");
    }
}
