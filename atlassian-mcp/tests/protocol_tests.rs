//! JSON-RPC and resource tests against a mock Atlassian site.

mod common;

use atlassian_mcp::{serve, McpError, McpRequest};
use common::TestFixture;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::BufReader;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn run_session(fixture: &TestFixture, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    serve(&fixture.mcp, BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn by_id(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("no response with id {}", id))
}

async fn rpc(fixture: &TestFixture, request: McpRequest) -> Value {
    let response = fixture
        .mcp
        .handle_request(request)
        .await
        .expect("request should get a response");
    serde_json::to_value(response).unwrap()
}

#[tokio::test]
async fn test_tools_call_downgrades_upstream_failure() {
    let fixture = TestFixture::new().await;

    Mock::given(method("DELETE"))
        .and(path("/wiki/rest/api/content/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "No content found with id: ContentId{id=404}"
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let response = rpc(
        &fixture,
        McpRequest::new(1_i64, "tools/call").with_params(json!({
            "name": "delete_confluence_page",
            "arguments": {"page_id": "404"}
        })),
    )
    .await;

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["content"][0],
        json!({
            "type": "text",
            "text": "Atlassian API error: No content found with id: ContentId{id=404}"
        })
    );
}

#[tokio::test]
async fn test_unknown_tool_makes_no_upstream_call() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.site)
        .await;

    let response = rpc(
        &fixture,
        McpRequest::new("x", "tools/call").with_params(json!({"name": "get_jira_tickets"})),
    )
    .await;

    assert_eq!(response["error"]["code"], McpError::METHOD_NOT_FOUND);
    assert_eq!(response["error"]["message"], "Unknown tool: get_jira_tickets");
}

#[tokio::test]
async fn test_successful_call_has_no_error_flag() {
    let fixture = TestFixture::new().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/3/issue/OPS-9"))
        .and(query_param("deleteSubtasks", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let response = rpc(
        &fixture,
        McpRequest::new(2_i64, "tools/call").with_params(json!({
            "name": "delete_jira_ticket",
            "arguments": {"ticket_key": "OPS-9", "delete_subtasks": true}
        })),
    )
    .await;

    assert!(response["result"].get("isError").is_none());
    assert_eq!(response["result"]["content"][0]["text"], "Deleted JIRA ticket: OPS-9");
}

#[tokio::test]
async fn test_resources_list() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/search/jql"))
        .and(query_param("jql", "updated >= -30d ORDER BY created DESC"))
        .and(query_param("maxResults", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [
                {"key": "OPS-1", "fields": {"summary": "Rotate keys", "status": {"name": "Done"}}},
                {"key": "OPS-2", "fields": {"summary": "Patch kernel"}}
            ]
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let response = rpc(&fixture, McpRequest::new(3_i64, "resources/list")).await;
    let resources = response["result"]["resources"].as_array().unwrap();

    assert_eq!(resources.len(), 3);
    assert_eq!(resources[0]["uri"], "jira://ticket/OPS-1");
    assert_eq!(resources[0]["description"], "Rotate keys (Done)");
    assert_eq!(resources[1]["description"], "Patch kernel (Unknown)");
    assert_eq!(resources[2]["uri"], "confluence://spaces");
    assert_eq!(resources[2]["mimeType"], "application/json");
}

#[tokio::test]
async fn test_resources_list_failure_is_empty() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/search/jql"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&fixture.site)
        .await;

    let response = rpc(&fixture, McpRequest::new(4_i64, "resources/list")).await;
    assert_eq!(response["result"]["resources"], json!([]));
}

#[tokio::test]
async fn test_read_page_resource() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/321"))
        .and(query_param("expand", "body.storage,version,space"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "321", "title": "Home"})))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let response = rpc(
        &fixture,
        McpRequest::new(5_i64, "resources/read").with_params(json!({"uri": "confluence://page/321"})),
    )
    .await;

    let contents = &response["result"]["contents"][0];
    assert_eq!(contents["uri"], "confluence://page/321");
    assert_eq!(contents["mimeType"], "application/json");
    let body: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["title"], "Home");
}

#[tokio::test]
async fn test_read_spaces_resource_uses_limit_25() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/space"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let response = rpc(
        &fixture,
        McpRequest::new(6_i64, "resources/read").with_params(json!({"uri": "confluence://spaces"})),
    )
    .await;
    assert!(response["result"]["contents"].is_array());
}

#[tokio::test]
async fn test_read_resource_failure_is_internal_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/OPS-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errorMessages": ["Issue does not exist or you do not have permission to see it."]
        })))
        .mount(&fixture.site)
        .await;

    let response = rpc(
        &fixture,
        McpRequest::new(7_i64, "resources/read").with_params(json!({"uri": "jira://ticket/OPS-404"})),
    )
    .await;

    assert_eq!(response["error"]["code"], McpError::INTERNAL_ERROR);
    assert_eq!(
        response["error"]["message"],
        "Atlassian API error: Issue does not exist or you do not have permission to see it."
    );
}

#[tokio::test]
async fn test_stdio_session() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/OPS-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "OPS-5"})))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "get_jira_ticket", "arguments": {"ticket_key": "OPS-5"}}
        }),
    ]
    .iter()
    .map(|v| format!("{}\n", v))
    .collect::<String>();

    let responses = run_session(&fixture, &input).await;

    assert_eq!(responses.len(), 3);
    assert_eq!(by_id(&responses, 1)["result"]["serverInfo"]["name"], "atlassian-server");
    assert_eq!(by_id(&responses, 2)["result"]["tools"].as_array().unwrap().len(), 52);
    assert!(by_id(&responses, 3)["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("OPS-5"));
}

#[tokio::test]
async fn test_slow_call_does_not_block_later_requests() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/OPS-7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"key": "OPS-7"}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&fixture.site)
        .await;

    let input = [
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "get_jira_ticket", "arguments": {"ticket_key": "OPS-7"}}
        }),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
    ]
    .iter()
    .map(|v| format!("{}\n", v))
    .collect::<String>();

    let responses = run_session(&fixture, &input).await;

    let ids: Vec<Value> = responses.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(2), json!(1)]);
    assert_eq!(responses[0]["result"], json!({}));
    assert!(responses[1]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("OPS-7"));
}
