//! Integration tests for bounded listing scans.

mod mocks;

use mocks::MockPipeRunClient;
use piperun_mcp_server::client::{fetch_all, PageBounds};
use piperun_mcp_server::domain::{ApiToken, Resource};
use piperun_mcp_server::error::PipeRunApiError;
use serde_json::{json, Map, Value};

fn page(start: usize, len: usize) -> Value {
    let items: Vec<Value> = (start..start + len).map(|i| json!({ "id": i + 1 })).collect();
    json!({ "data": items })
}

fn token() -> ApiToken {
    ApiToken::new("test-token").unwrap()
}

#[tokio::test]
async fn test_short_page_ends_scan() {
    let mock = MockPipeRunClient::new();
    mock.respond("GET /persons", page(0, 200));
    mock.respond("GET /persons", page(200, 200));
    mock.respond("GET /persons", page(400, 37));

    let items = fetch_all(
        &mock,
        &token(),
        Resource::Persons,
        &Map::new(),
        PageBounds::new(200, 5),
    )
    .await
    .unwrap();

    assert_eq!(items.len(), 437);
    assert_eq!(mock.get_call_count("GET /persons"), 3);

    let calls = mock.calls_to("GET /persons");
    for (i, call) in calls.iter().enumerate() {
        let expected_page = (i + 1).to_string();
        assert_eq!(call.query_value("page"), Some(expected_page.as_str()));
        assert_eq!(call.query_value("show"), Some("200"));
    }
}

#[tokio::test]
async fn test_page_ceiling_stops_scan() {
    let mock = MockPipeRunClient::new();
    for i in 0..3 {
        mock.respond("GET /companies", page(i * 200, 200));
    }

    let items = fetch_all(
        &mock,
        &token(),
        Resource::Companies,
        &Map::new(),
        PageBounds::new(200, 2),
    )
    .await
    .unwrap();

    assert_eq!(items.len(), 400);
    assert_eq!(mock.get_call_count("GET /companies"), 2);
}

#[tokio::test]
async fn test_bare_array_pages_are_accepted() {
    let mock = MockPipeRunClient::new();
    mock.respond("GET /deals", json!([{ "id": 1 }, { "id": 2 }]));

    let items = fetch_all(
        &mock,
        &token(),
        Resource::Deals,
        &Map::new(),
        PageBounds::new(10, 3),
    )
    .await
    .unwrap();

    assert_eq!(items, vec![json!({ "id": 1 }), json!({ "id": 2 })]);
    assert_eq!(mock.total_calls(), 1);
}

#[tokio::test]
async fn test_unknown_shape_ends_scan_with_what_was_collected() {
    let mock = MockPipeRunClient::new();
    mock.respond("GET /deals", page(0, 2));
    mock.respond("GET /deals", json!({ "message": "unexpected" }));

    let items = fetch_all(
        &mock,
        &token(),
        Resource::Deals,
        &Map::new(),
        PageBounds::new(2, 5),
    )
    .await
    .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(mock.get_call_count("GET /deals"), 2);
}

#[tokio::test]
async fn test_filter_is_forwarded_on_every_page() {
    let mock = MockPipeRunClient::new();
    mock.respond("GET /deals", page(0, 1));
    mock.respond("GET /deals", page(1, 1));

    let mut filter = Map::new();
    filter.insert("pipeline_id".to_string(), json!(7));

    fetch_all(
        &mock,
        &token(),
        Resource::Deals,
        &filter,
        PageBounds::new(1, 2),
    )
    .await
    .unwrap();

    let calls = mock.calls_to("GET /deals");
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.query_value("pipeline_id") == Some("7")));
}

#[tokio::test]
async fn test_upstream_error_propagates() {
    let mock = MockPipeRunClient::new();
    mock.respond("GET /persons", page(0, 2));
    mock.fail("GET /persons", 500, "boom");

    let result = fetch_all(
        &mock,
        &token(),
        Resource::Persons,
        &Map::new(),
        PageBounds::new(2, 5),
    )
    .await;

    assert!(matches!(
        result,
        Err(PipeRunApiError::ApiError { status: 500, .. })
    ));
}
