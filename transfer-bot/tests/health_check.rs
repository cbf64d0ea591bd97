//! Liveness endpoint tests; no external services required.

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use transfer_bot::handlers::health::LIVENESS_BODY;
use transfer_bot::handlers::health_router;

async fn get(path: &str) -> (StatusCode, Bytes) {
    let response = health_router()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body)
}

#[tokio::test]
async fn root_returns_fixed_body() {
    let (status, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], LIVENESS_BODY.as_bytes());
}

#[tokio::test]
async fn health_returns_service_status() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "transfer-bot");
}

#[tokio::test]
async fn metrics_is_plain_text() {
    let (status, _) = get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (status, _) = get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
