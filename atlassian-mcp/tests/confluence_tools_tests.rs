//! End-to-end tests for the Confluence tools.

mod common;

use common::{json_text, TestFixture};
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_update_page_bumps_version_and_keeps_title_and_body() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/123"))
        .and(query_param("expand", "version,space,body.storage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123",
            "type": "page",
            "title": "Runbook",
            "space": {"key": "OPS"},
            "version": {"number": 7},
            "body": {"storage": {"value": "<p>old</p>", "representation": "storage"}}
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/123"))
        .and(body_json(json!({
            "id": "123",
            "type": "page",
            "title": "Runbook",
            "space": {"key": "OPS"},
            "version": {"number": 8},
            "body": {"storage": {"value": "<p>new</p>", "representation": "storage"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "123"})))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call(
            "update_confluence_page",
            json!({"page_id": "123", "content": "<p>new</p>"}),
        )
        .await;
    assert_eq!(result.first_text(), Some("Updated Confluence page: 123"));
}

#[tokio::test]
async fn test_update_page_conflict_is_error_result() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123",
            "title": "Runbook",
            "space": {"key": "OPS"},
            "version": {"number": 7}
        })))
        .mount(&fixture.site)
        .await;

    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/123"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "statusCode": 409,
            "message": "Version must be incremented on update. Current version is: 8"
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call("update_confluence_page", json!({"page_id": "123", "title": "Runbook v2"}))
        .await;
    assert!(result.is_error);
    assert_eq!(
        result.first_text(),
        Some("Atlassian API error: Version must be incremented on update. Current version is: 8")
    );
}

#[tokio::test]
async fn test_search_escapes_query() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/search"))
        .and(query_param("cql", r#"space = "ENG" AND text ~ "say \"hi\"""#))
        .and(query_param("limit", "10"))
        .and(query_param("expand", "space,version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "size": 0})))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call(
            "search_confluence_by_space",
            json!({"space_key": "ENG", "query": "say \"hi\""}),
        )
        .await;
    assert_eq!(json_text(&result)["size"], 0);
}

#[tokio::test]
async fn test_add_comment_looks_up_space() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/55"))
        .and(query_param("expand", "space"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "55",
            "space": {"key": "DOC"}
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/content"))
        .and(body_json(json!({
            "type": "comment",
            "space": {"key": "DOC"},
            "container": {"id": "55", "type": "page"},
            "body": {"storage": {"value": "<p>Looks good</p>", "representation": "storage"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "901",
            "_links": {"webui": "/spaces/DOC/pages/55?focusedCommentId=901"}
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call(
            "add_comment_to_confluence_page",
            json!({"page_id": "55", "comment": "<p>Looks good</p>"}),
        )
        .await;

    let body = json_text(&result);
    assert_eq!(body["id"], "901");
    assert_eq!(body["page_id"], "55");
}

#[tokio::test]
async fn test_add_comment_with_space_skips_lookup() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.site)
        .await;

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "902"})))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call(
            "add_comment_to_confluence_page",
            json!({"page_id": "55", "comment": "hi", "space_key": "DOC"}),
        )
        .await;
    assert_eq!(json_text(&result)["url"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_update_comment_without_version_is_internal_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/901"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "901",
            "space": {"key": "DOC"}
        })))
        .mount(&fixture.site)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.site)
        .await;

    let err = fixture
        .mcp
        .call_tool(
            "update_confluence_comment",
            json!({"comment_id": "901", "comment": "edited"}),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), -32603);
    assert_eq!(err.to_string(), "Could not determine version from comment");
}

#[tokio::test]
async fn test_remove_label_encodes_path() {
    let fixture = TestFixture::new().await;

    Mock::given(method("DELETE"))
        .and(path("/wiki/rest/api/content/77/label/needs%20review"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call(
            "remove_label_from_confluence_page",
            json!({"page_id": "77", "label": "needs review"}),
        )
        .await;
    assert_eq!(
        result.first_text(),
        Some("Removed label \"needs review\" from Confluence page: 77")
    );
}

#[tokio::test]
async fn test_upload_attachment_uses_confluence_xsrf_header() {
    let fixture = TestFixture::new().await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "a,b\n1,2").unwrap();
    let file_path = file.path().to_string_lossy().to_string();

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/content/77/child/attachment"))
        .and(header("X-Atlassian-Token", "nocheck"))
        .and(body_string_contains("name=\"comment\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "att5",
                "title": "data.csv",
                "_links": {"webui": "/pages/viewpageattachments.action?pageId=77"}
            }]
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call(
            "upload_attachment_to_confluence_page",
            json!({"page_id": "77", "file_path": file_path, "comment": "latest export"}),
        )
        .await;

    let body = json_text(&result);
    assert_eq!(body["id"], "att5");
    assert_eq!(body["filename"], "data.csv");
    assert_eq!(body["page_id"], "77");
}

#[tokio::test]
async fn test_download_attachment_by_name() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/77/child/attachment"))
        .and(query_param("filename", "diagram.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "att9",
                "title": "diagram.png",
                "_links": {"download": "/download/attachments/77/diagram.png"},
                "extensions": {"mediaType": "image/png", "fileSize": 4096}
            }]
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    let result = fixture
        .call(
            "download_confluence_attachment",
            json!({"page_id": "77", "filename": "diagram.png"}),
        )
        .await;

    let body = json_text(&result);
    assert_eq!(body["download_url"], "/download/attachments/77/diagram.png");
    assert_eq!(body["media_type"], "image/png");
}

#[tokio::test]
async fn test_all_spaces_are_cached_but_filtered_listing_is_not() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/space"))
        .and(query_param("keys", "ENG"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"key": "ENG"}]})))
        .expect(2)
        .mount(&fixture.site)
        .await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/space"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"key": "ENG"}, {"key": "OPS"}]
        })))
        .expect(1)
        .mount(&fixture.site)
        .await;

    for _ in 0..2 {
        let all = fixture.call("get_confluence_spaces", json!({})).await;
        assert_eq!(json_text(&all)["results"][1]["key"], "OPS");

        let filtered = fixture
            .call("get_confluence_spaces", json!({"space_keys": ["ENG"]}))
            .await;
        assert_eq!(json_text(&filtered)["results"][0]["key"], "ENG");
    }
}
