//! Health endpoint integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

mod common;
use common::{create_lazy_pool, create_test_app_state, create_test_config};

#[tokio::test]
async fn test_health_check() {
    let config = create_test_config();
    let pool = create_lazy_pool(&config);
    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_tracking_headers_present() {
    let config = create_test_config();
    let pool = create_lazy_pool(&config);
    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().get("x-request-id").is_some());
    assert!(response.headers().get("x-process-time").is_some());
}

#[tokio::test]
async fn test_readiness_reports_database_check() {
    let config = create_test_config();
    let pool = create_lazy_pool(&config);
    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Readiness always answers; the database result is in the body
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["ready"].is_boolean());
    assert_eq!(body["checks"][0]["name"], "database");
}
