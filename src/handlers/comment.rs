//! Comment handlers
//! Threaded comments: replies reference a parent comment on the same post.

use crate::{
    auth::Principal,
    error::AppError,
    middleware::AppState,
    models::comment::{CommentResponse, CreateCommentRequest},
    repository::{CommentRepository, PostRepository},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Create a comment on a post
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(post_id): Path<i64>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let post = PostRepository::new(state.db.clone())
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    if !post.post.allow_comments {
        return Err(AppError::bad_request("Comments are disabled for this post"));
    }

    let comment_repo = CommentRepository::new(state.db.clone());

    // A reply must target a comment on the same post
    if let Some(parent_id) = req.parent_id {
        let parent = comment_repo
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("parent comment"))?;

        if parent.post_id != post_id {
            return Err(AppError::bad_request(
                "Parent comment belongs to a different post",
            ));
        }
    }

    let comment = comment_repo
        .create(post_id, principal.user.id, req.parent_id, &req.content)
        .await?;

    tracing::info!(comment_id = comment.id, post_id, "Comment created");

    let response = CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        username: principal.user.username,
        parent_id: comment.parent_id,
        content: comment.content,
        likes_count: comment.likes_count,
        created_at: comment.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// List all comments on a post, oldest first
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    _principal: Principal,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    PostRepository::new(state.db.clone())
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    let comments = CommentRepository::new(state.db.clone())
        .list_for_post(post_id)
        .await?;

    Ok(Json(comments))
}

/// Delete a comment. Admin or the commenter.
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comment_repo = CommentRepository::new(state.db.clone());

    let comment = comment_repo
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("comment"))?;

    if !(principal.is_admin() || comment.user_id == principal.user.id) {
        return Err(AppError::Forbidden);
    }

    comment_repo.delete(comment_id).await?;

    tracing::info!(comment_id, deleted_by = %principal.user.username, "Comment deleted");

    Ok(Json(json!({"detail": "Comment deleted successfully"})))
}
