//! Route registration
//! Assembles the router and applies the middleware chain.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{auth, handlers, middleware::AppState};

/// Build the application router.
///
/// Chain order for every request, outermost first: rate limiting,
/// request tracking (timing + logging), CORS, then the handler.
/// Protected routes additionally pass through `require_auth`, which
/// resolves the calling principal.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Open endpoints: health probes, registration, token issuance
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/token", post(handlers::auth::login))
        .route("/users", post(handlers::user::create_user));

    let protected_routes = Router::new()
        .route("/users", get(handlers::user::list_users))
        .route(
            "/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route(
            "/posts",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::post::get_post)
                .put(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
        .route(
            "/posts/{id}/comments",
            get(handlers::comment::list_comments).post(handlers::comment::create_comment),
        )
        .route(
            "/comments/{id}",
            axum::routing::delete(handlers::comment::delete_comment),
        )
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(from_fn(crate::middleware::request_tracking_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit_middleware,
        ))
        .with_state(state)
}
