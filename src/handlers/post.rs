//! Post CRUD handlers

use crate::{
    auth::Principal,
    error::AppError,
    middleware::AppState,
    models::post::{CreatePostRequest, PostResponse, UpdatePostRequest},
    repository::PostRepository,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::user::Pagination;

/// List all posts. Admin only.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    if !principal.is_admin() {
        return Err(AppError::Forbidden);
    }

    pagination.validate()?;

    let posts = PostRepository::new(state.db.clone())
        .list(pagination.limit, pagination.offset)
        .await?;

    let posts: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(Json(posts))
}

/// Create a post authored by the caller
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let post = PostRepository::new(state.db.clone())
        .create(principal.user.id, &req)
        .await?;

    tracing::info!(post_id = post.id, author = %principal.user.username, "Post created");

    let response = PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        author_id: post.author_id,
        author_name: principal.user.username,
        view_count: post.view_count,
        is_featured: post.is_featured,
        allow_comments: post.allow_comments,
        likes_count: post.likes_count,
        created_at: post.created_at,
        updated_at: post.updated_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a post by id
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    _principal: Principal,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = PostRepository::new(state.db.clone())
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    Ok(Json(PostResponse::from(post)))
}

/// Update a post. Admin or owner.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(post_id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let post_repo = PostRepository::new(state.db.clone());

    let existing = post_repo
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    if !(principal.is_admin() || existing.post.author_id == principal.user.id) {
        return Err(AppError::Forbidden);
    }

    let updated = post_repo
        .update(post_id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    let response = PostResponse {
        id: updated.id,
        title: updated.title,
        content: updated.content,
        author_id: updated.author_id,
        author_name: existing.author_name,
        view_count: updated.view_count,
        is_featured: updated.is_featured,
        allow_comments: updated.allow_comments,
        likes_count: updated.likes_count,
        created_at: updated.created_at,
        updated_at: updated.updated_at,
    };

    Ok(Json(response))
}

/// Delete a post. Admin or owner.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post_repo = PostRepository::new(state.db.clone());

    let existing = post_repo
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    if !(principal.is_admin() || existing.post.author_id == principal.user.id) {
        return Err(AppError::Forbidden);
    }

    post_repo.delete(post_id).await?;

    tracing::info!(post_id, deleted_by = %principal.user.username, "Post deleted");

    Ok(Json(json!({"detail": "Post deleted successfully"})))
}
