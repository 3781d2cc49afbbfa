//! Tests for the paginated knowledge-base search route.


use std::sync::Arc;

use axum::http::StatusCode;

use test_helpers::{make_state, MockSink, StaticSource, StaticSourceProvider, TestApp};

fn app_with(sink: MockSink) -> (TestApp, Arc<MockSink>) {
    let sink = Arc::new(sink);
    let state = make_state(
        Arc::new(StaticSourceProvider::new(StaticSource::with_sites(1))),
        sink.clone(),
        "http://127.0.0.1:9",
    );
    (TestApp::new(state), sink)
}

#[tokio::test]
async fn test_search_default_page() {
    let (app, sink) = app_with(MockSink::with_hits(25));
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/search",
            Some(r#"{"query":"budget","userId":"u-1","accessToken":"t"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["results"].as_array().unwrap().len(), 10);
    assert_eq!(body["results"][0]["id"], "hit-1");
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["pageSize"], 10);
    assert_eq!(body["pagination"]["totalResults"], 25);
    assert_eq!(body["pagination"]["totalPages"], 3);

    assert_eq!(
        *sink.searches.lock().unwrap(),
        vec![("budget".to_string(), Some("u-1".to_string()))]
    );
}

#[tokio::test]
async fn test_search_last_partial_page() {
    let (app, _) = app_with(MockSink::with_hits(25));
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/search",
            Some(r#"{"query":"q","accessToken":"t","page":3,"pageSize":10}"#),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(results[0]["id"], "hit-21");
}

#[tokio::test]
async fn test_search_validates_query_before_token() {
    let (app, sink) = app_with(MockSink::with_hits(1));
    let (status, body) = app
        .call_json("POST", "/api/sharepoint/search", Some("{}"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Search query is required");

    let (status, body) = app
        .call_json("POST", "/api/sharepoint/search", Some(r#"{"query":"q"}"#))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Access token is required");

    assert!(sink.searches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_rejects_zero_page() {
    let (app, _) = app_with(MockSink::with_hits(1));
    for body in [
        r#"{"query":"q","accessToken":"t","page":0}"#,
        r#"{"query":"q","accessToken":"t","pageSize":0}"#,
    ] {
        let (status, _) = app.call("POST", "/api/sharepoint/search", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_search_sink_failure_is_500() {
    let (app, _) = app_with(MockSink {
        fail: true,
        ..Default::default()
    });
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/search",
            Some(r#"{"query":"q","accessToken":"t"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Search failed");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Knowledge base unavailable"));
}

#[tokio::test]
async fn test_search_negative_page_is_json_400() {
    let (app, sink) = app_with(MockSink::with_hits(1));
    let (status, body) = app
        .call_json(
            "POST",
            "/api/sharepoint/search",
            Some(r#"{"query":"q","accessToken":"t","page":-2}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert!(sink.searches.lock().unwrap().is_empty());
}
