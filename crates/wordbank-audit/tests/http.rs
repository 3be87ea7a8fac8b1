use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use wordbank_audit::handlers::{AppState, router};
use wordbank_consensus::{EngineConfig, Pipeline};

fn make_state() -> AppState {
    AppState {
        pipeline: Arc::new(Pipeline::new(EngineConfig::default())),
    }
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(make_state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap())
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn classify_endpoint_returns_pos() {
    let (status, body) = get_json("/v1/classify?headword=quickly").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pos"], "adverb");
    assert_eq!(body["confidence"], 80);
    assert_eq!(body["evidence"], "suffix_ly");
    assert_eq!(body["is_phrase"], false);

    let (status, body) = get_json("/v1/classify?headword=take%20off&gloss=%E9%9B%A2%E9%99%B8%E3%81%99%E3%82%8B").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pos"], "phrase");
    assert_eq!(body["is_phrase"], true);
}

#[tokio::test]
async fn classify_endpoint_rejects_blank_headword() {
    let (status, body) = get_json("/v1/classify?headword=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("headword")
    );
}

#[tokio::test]
async fn normalize_endpoint_handles_both_kinds() {
    let (status, body) = get_json("/v1/normalize?text=DUO3.0&kind=book").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "book");
    assert_eq!(body["normalized"], "duo30");

    let (status, body) = get_json("/v1/normalize?text=%20Apple%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "headword");
    assert_eq!(body["normalized"], "apple");

    let (status, _) = get_json("/v1/normalize?text=x&kind=gloss").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn aggregate_endpoint_merges_rows() {
    let rows = serde_json::json!([
        {"book": "DUO3.0", "number": 12, "headword": "run", "gloss": "走る"},
        {"book": "システム英単語 5訂版", "number": "40", "headword": "Run", "gloss": "走る"},
        {"book": "DUO3.0", "number": "twelve", "headword": "walk", "gloss": "歩く"}
    ]);
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/aggregate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(rows.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["rows"], 3);
    assert_eq!(body["dropped"], 1);
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["headword_norm"], "run");
    assert_eq!(entries[0]["pos"], "verb");
    assert_eq!(entries[0]["source_count"], 2);
}
