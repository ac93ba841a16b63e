// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP routes.

pub mod collisions;
pub mod coverage;
pub mod health;

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

/// Build the application router with middleware.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        // Root endpoint - API information
        .route("/", get(health::info))
        // Health check
        .route("/api/v1/health", get(health::check))
        // Coverage endpoints
        .route("/api/v1/coverage", post(coverage::coverage))
        .route("/api/v1/coverage/incremental", post(coverage::incremental))
        .route("/api/v1/coverage/waypoints", post(coverage::waypoints))
        .route("/api/v1/coverage/waypoints/:index", post(coverage::waypoint))
        // Collision endpoint
        .route("/api/v1/collisions", post(collisions::collisions))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_body_size_mb * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            config: Arc::new(Config::default()),
        })
    }

    fn triangle_request() -> Value {
        json!({
            "mesh": { "vertices": [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 0.0] },
            "path": [
                { "x": 3.3, "y": 3.3, "z": 20.0, "normalX": 0.0, "normalY": 0.0, "normalZ": -1.0 },
                { "x": 3.3, "y": 3.3, "z": -5.0 }
            ],
            "config": { "verticalFov": 90.0, "aspectRatio": 1.0 }
        })
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_service() {
        let response = app()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "inspect-lite-server");
    }

    #[tokio::test]
    async fn coverage_returns_camel_case_metrics() {
        let (status, body) = post_json("/api/v1/coverage", triangle_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert!((body["coverage"].as_f64().unwrap() - 100.0).abs() < 1e-9);
        assert!((body["coveredArea"].as_f64().unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(body["overlapArea"], 0.0);
        assert!(body["overlapArea"].as_f64().unwrap().is_sign_positive());
    }

    #[tokio::test]
    async fn incremental_has_one_entry_per_waypoint() {
        let (status, body) = post_json("/api/v1/coverage/incremental", triangle_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coverage"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn waypoint_metrics_and_out_of_range() {
        let (status, body) = post_json("/api/v1/coverage/waypoints/1", triangle_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["overlapWithPrevious"].is_number());

        let (status, body) = post_json("/api/v1/coverage/waypoints/7", triangle_request()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
        assert_eq!(
            body["error"],
            "Invalid argument: Waypoint index 7 out of range for path of length 2"
        );

        let (status, body) = post_json("/api/v1/coverage/waypoints", triangle_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body[0]["overlapWithPrevious"].is_null());
    }

    #[tokio::test]
    async fn collisions_through_triangle() {
        let (status, body) = post_json("/api/v1/collisions", triangle_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasCollision"], true);
        assert_eq!(body["collisions"][0]["pathIndex"], 0);
        assert_eq!(body["collisions"][0]["kind"], "segment");
    }

    #[tokio::test]
    async fn empty_mesh_is_zero_not_error() {
        let (status, body) = post_json(
            "/api/v1/collisions",
            json!({ "mesh": { "vertices": [] }, "path": [{ "x": 0, "y": 0, "z": 0 }] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collisionCount"], 0);
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_request() {
        let (status, body) = post_json("/api/v1/coverage", json!({ "path": "nope" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }
}
