//! Authentication API integration tests
//!
//! The rejection-path tests build the full router over a lazy pool and
//! never touch the database. Tests that need real rows are marked
//! `#[ignore]` and expect `TEST_DATABASE_URL` (or a local postgres).

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{create_lazy_pool, create_test_app_state, create_test_config, create_test_user};

#[tokio::test]
async fn test_protected_route_without_token() {
    let config = create_test_config();
    let pool = create_lazy_pool(&config);
    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 401 must carry the re-authentication challenge
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .expect("WWW-Authenticate header on 401");
    assert_eq!(challenge, "Bearer");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], 401);
    assert!(body["error"]["request_id"].is_string());
}

#[tokio::test]
async fn test_protected_route_with_basic_scheme() {
    let config = create_test_config();
    let pool = create_lazy_pool(&config);
    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/posts")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let config = create_test_config();
    let pool = create_lazy_pool(&config);
    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    // Signature verification fails before any user lookup
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/posts")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_some());
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let config = create_test_config();
    let pool = create_lazy_pool(&config);
    let state = create_test_app_state(pool, config);
    let token = state
        .token_service
        .issue_with_ttl("alice", chrono::Duration::minutes(-5))
        .unwrap();
    let app = blog_service::routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/posts")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // needs a database
async fn test_login_success() {
    let config = create_test_config();
    let pool = common::setup_test_db(&config).await;

    let username = "testuser";
    let password = "TestPass123";
    create_test_user(&pool, username, password, "test@example.com", "reader")
        .await
        .expect("Failed to create test user");

    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let request_body = json!({
        "username": username,
        "password": password
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "bearer");
}

#[tokio::test]
#[ignore] // needs a database
async fn test_login_failures_are_indistinguishable() {
    let config = create_test_config();
    let pool = common::setup_test_db(&config).await;

    create_test_user(&pool, "testuser", "TestPass123", "test@example.com", "reader")
        .await
        .expect("Failed to create test user");

    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let mut messages = Vec::new();

    // Known user with the wrong password, then an unknown user
    for (username, password) in [("testuser", "WrongPassword"), ("nonexistent", "TestPass123")] {
        let request_body = json!({
            "username": username,
            "password": password
        });

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        messages.push(body["error"]["message"].as_str().unwrap().to_string());
    }

    assert_eq!(messages[0], messages[1]);
    assert_eq!(messages[0], "Incorrect username or password");
}

#[tokio::test]
#[ignore] // needs a database
async fn test_inactive_user_is_rejected() {
    let config = create_test_config();
    let pool = common::setup_test_db(&config).await;

    let password = "TestPass123";
    for (username, email, status) in [
        ("suspended_user", "suspended@example.com", "suspended"),
        ("deleted_user", "deleted@example.com", "deleted"),
    ] {
        common::create_test_user_with_status(&pool, username, password, email, "reader", status)
            .await
            .expect("Failed to create test user");
    }

    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state.clone());

    for username in ["suspended_user", "deleted_user"] {
        // A structurally valid token does not help a non-active account
        let token = state.token_service.issue(username).unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/posts")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Login with correct credentials is refused the same way
        let request_body = json!({
            "username": username,
            "password": password
        });

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
#[ignore] // needs a database
async fn test_token_grants_access_to_protected_route() {
    let config = create_test_config();
    let pool = common::setup_test_db(&config).await;

    let username = "testuser";
    let password = "TestPass123";
    create_test_user(&pool, username, password, "test@example.com", "admin")
        .await
        .expect("Failed to create test user");

    let state = create_test_app_state(pool, config);
    let app = blog_service::routes::create_router(state);

    let login_body = json!({
        "username": username,
        "password": password
    });

    let login_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(login_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let bytes = login_response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes();
    let login_json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let access_token = login_json["access_token"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/posts")
                .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
