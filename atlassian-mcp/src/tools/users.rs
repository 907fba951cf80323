//! JIRA user lookup
//!
//! Resolves emails and usernames to account ids. The first match wins;
//! there is no disambiguation between several matches.

use crate::clients::AtlassianClient;
use crate::error::{ToolCallResult, ToolError};
use serde_json::Value;
use tracing::{debug, instrument};

const USER_SEARCH_PATH: &str = "/rest/api/3/user/search";

async fn first_account_id(
    client: &AtlassianClient,
    query: &str,
) -> ToolCallResult<Option<String>> {
    let users = client
        .get(USER_SEARCH_PATH, &[("query", query.to_string())])
        .await?;

    Ok(users
        .as_array()
        .and_then(|list| list.first())
        .and_then(|user| user.get("accountId"))
        .and_then(Value::as_str)
        .map(String::from))
}

/// Look up an account id by email address.
#[instrument(skip(client))]
pub async fn lookup_user_by_email(client: &AtlassianClient, email: &str) -> ToolCallResult<String> {
    first_account_id(client, email)
        .await?
        .ok_or_else(|| ToolError::invalid_params(format!("User with email \"{}\" not found", email)))
}

/// Look up an account id by username.
#[instrument(skip(client))]
pub async fn lookup_user_by_username(
    client: &AtlassianClient,
    username: &str,
) -> ToolCallResult<String> {
    first_account_id(client, username).await?.ok_or_else(|| {
        ToolError::invalid_params(format!("User with username \"{}\" not found", username))
    })
}

/// Resolve an email or account id to an account id.
///
/// Identifiers containing `@` are looked up as emails; anything else is
/// returned unchanged.
pub async fn resolve_user_to_account_id(
    client: &AtlassianClient,
    identifier: &str,
) -> ToolCallResult<String> {
    if identifier.contains('@') {
        lookup_user_by_email(client, identifier).await
    } else {
        debug!("Treating {} as an account id", identifier);
        Ok(identifier.to_string())
    }
}
