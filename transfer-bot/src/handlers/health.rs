//! Liveness endpoint for the hosting platform.

use crate::services::get_metrics;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

pub const LIVENESS_BODY: &str = "MongoDB Transfer Bot is running";

/// Always 200 while the process is up.
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, LIVENESS_BODY)
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "transfer-bot",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(TraceLayer::new_for_http())
}
