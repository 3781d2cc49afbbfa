//! Tests for health, indexing, sync and permission routes.


use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use test_helpers::{make_state, make_test_state, MockSink, StaticSource, StaticSourceProvider, TestApp};

// ── Health ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_returns_ok() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app.call_json("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

// ── Indexing ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_index_requires_access_token() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json("POST", "/api/sharepoint/index", Some(r#"{"contentTypes":["sites"]}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Access token is required"}));

    let (status, _) = app
        .call("POST", "/api/sharepoint/index", Some(r#"{"accessToken":""}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_index_with_defaults_indexes_everything() {
    let provider = Arc::new(StaticSourceProvider::new(StaticSource::with_sites(2)));
    let app = TestApp::new(make_state(
        provider.clone(),
        Arc::new(MockSink::default()),
        "http://127.0.0.1:9",
    ));

    let (status, body) = app
        .call_json("POST", "/api/sharepoint/index", Some(r#"{"accessToken":"tok-1"}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Indexing completed successfully");

    let job = &body["job"];
    assert!(job["id"].as_str().unwrap().starts_with("job-"));
    assert_eq!(job["status"], "completed");
    assert_eq!(job["syncType"], "regular");
    assert_eq!(job["searchDepth"], 3);
    assert_eq!(job["itemsIndexed"], 6);
    assert_eq!(
        job["contentTypes"],
        json!(["sites", "pages", "lists", "libraries"])
    );
    assert!(job["nextScheduledSync"].is_string());

    let items = body["indexedItems"].as_array().unwrap();
    assert_eq!(items.len(), 6);
    assert_eq!(items[0]["type"], "site");
    assert_eq!(items[1]["type"], "list");
    assert_eq!(
        items[1]["url"],
        "https://contoso.sharepoint.com/sites/site1/lists/Tasks"
    );
    assert_eq!(items[1]["parentSite"], "Site 1");
    assert_eq!(items[2]["type"], "document");

    assert_eq!(*provider.tokens.lock().unwrap(), vec!["tok-1".to_string()]);
}

#[tokio::test]
async fn test_index_once_has_no_next_sync() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/index",
            Some(r#"{"accessToken":"t","contentTypes":["sites"],"syncType":"once","searchDepth":1}"#),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["itemsIndexed"], 2);
    assert_eq!(body["job"]["searchDepth"], 1);
    assert!(body["job"]["nextScheduledSync"].is_null());
}

#[tokio::test]
async fn test_index_preview_is_capped() {
    let app = TestApp::new(make_state(
        Arc::new(StaticSourceProvider::new(StaticSource::with_sites(5))),
        Arc::new(MockSink::default()),
        "http://127.0.0.1:9",
    ));
    let (status, body) = app
        .call_json("POST", "/api/sharepoint/index", Some(r#"{"accessToken":"t"}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["itemsIndexed"], 15);
    assert_eq!(body["indexedItems"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_index_upstream_failure_is_500_and_records_nothing() {
    let app = TestApp::new(make_state(
        Arc::new(StaticSourceProvider::new(StaticSource::failing(403))),
        Arc::new(MockSink::default()),
        "http://127.0.0.1:9",
    ));

    let (status, body) = app
        .call_json("POST", "/api/sharepoint/index", Some(r#"{"accessToken":"t"}"#))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to complete indexing");
    assert!(body["details"].as_str().unwrap().contains("Access denied"));

    let (_, jobs) = app.call_json("GET", "/api/sharepoint/index", None).await;
    assert_eq!(jobs, json!({"success": true, "jobs": []}));
}

#[tokio::test]
async fn test_index_rejects_unknown_content_type() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/index",
            Some(r#"{"accessToken":"t","contentTypes":["videos"]}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].as_str().unwrap().contains("videos"));

    let (_, jobs) = app.call_json("GET", "/api/sharepoint/index", None).await;
    assert_eq!(jobs["jobs"], json!([]));
}

#[tokio::test]
async fn test_index_checks_token_before_body_fields() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/index",
            Some(r#"{"contentTypes":["videos"],"searchDepth":-1}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Access token is required"}));
}

#[tokio::test]
async fn test_index_rejects_negative_search_depth() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/index",
            Some(r#"{"accessToken":"t","searchDepth":-1}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_malformed_bodies_get_json_envelope() {
    let app = TestApp::new(make_test_state());
    let cases: [(&str, Option<&str>); 4] = [
        ("/api/sharepoint/index", Some("not json")),
        ("/api/sharepoint/sync", None),
        ("/api/sharepoint/permissions", Some("{")),
        ("/api/sharepoint/search", None),
    ];
    for (uri, raw) in cases {
        let (status, headers, bytes) = app.call_with_headers("POST", uri, raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid request body", "{uri}");
        assert!(body["details"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_permission_flag_type_mismatch_is_400() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/permissions",
            Some(r#"{"accessToken":"t","mirrorPermissions":"yes"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_index_jobs_listed_in_order() {
    let app = TestApp::new(make_test_state());
    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, body) = app
            .call_json("POST", "/api/sharepoint/index", Some(r#"{"accessToken":"t"}"#))
            .await;
        ids.push(body["job"]["id"].as_str().unwrap().to_string());
    }

    let (status, body) = app.call_json("GET", "/api/sharepoint/index", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, ids);
}

// ── Sync ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sync_start_and_lookup() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json("POST", "/api/sharepoint/sync", Some(r#"{"accessToken":"t"}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sync job started successfully");
    assert_eq!(body["job"]["status"], "started");
    let id = body["job"]["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("sync-job-"));

    let (status, found) = app
        .call_json("GET", &format!("/api/sharepoint/sync?jobId={id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["success"], true);
    assert_eq!(found["job"], body["job"]);
}

#[tokio::test]
async fn test_sync_requires_token() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json("POST", "/api/sharepoint/sync", Some("{}"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Access token is required");
}

#[tokio::test]
async fn test_sync_status_requires_job_id() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app.call_json("GET", "/api/sharepoint/sync", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Job ID is required");
}

#[tokio::test]
async fn test_sync_status_unknown_job_is_404() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json("GET", "/api/sharepoint/sync?jobId=sync-job-missing", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Sync job not found");
    assert_eq!(body["details"], "sync-job-missing");
}

// ── Permissions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_permission_sync_records_job() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json("POST", "/api/sharepoint/permissions", Some(r#"{"accessToken":"t"}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["job"]["id"].as_str().unwrap().starts_with("perm-job-"));

    let (_, listed) = app
        .call_json("GET", "/api/sharepoint/permissions", None)
        .await;
    assert_eq!(listed["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(listed["jobs"][0], body["job"]);
}

#[tokio::test]
async fn test_permission_mirroring_disabled_records_nothing() {
    let app = TestApp::new(make_test_state());
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/permissions",
            Some(r#"{"accessToken":"t","mirrorPermissions":false}"#),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Permission mirroring is disabled");
    assert!(body.get("job").is_none());

    let (_, listed) = app
        .call_json("GET", "/api/sharepoint/permissions", None)
        .await;
    assert_eq!(listed["jobs"], json!([]));
}

#[tokio::test]
async fn test_permission_sync_requires_token() {
    let app = TestApp::new(make_test_state());
    let (status, _) = app
        .call("POST", "/api/sharepoint/permissions", Some(r#"{"mirrorPermissions":true}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Real-time channel ───────────────────────────────────────────────────

#[tokio::test]
async fn test_websocket_is_not_implemented() {
    let app = TestApp::new(make_test_state());
    let (status, headers, body) = app.call_with_headers("GET", "/api/websocket", None).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert!(String::from_utf8(body).unwrap().contains("not implemented"));
}
