//! User CRUD handlers

use crate::{
    auth::{PasswordHasher, Principal},
    error::AppError,
    middleware::AppState,
    models::user::{CreateUserRequest, UpdateUserRequest, UserResponse},
    repository::UserRepository,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// List query parameters. Negative values are rejected up front so
/// they never reach the database.
#[derive(Debug, Deserialize, Validate)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, max = 500))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// List all users. Admin only.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    if !principal.is_admin() {
        return Err(AppError::Forbidden);
    }

    pagination.validate()?;

    let users = UserRepository::new(state.db.clone())
        .list(pagination.limit, pagination.offset)
        .await?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(users))
}

/// Register a new user. Public endpoint.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user_repo = UserRepository::new(state.db.clone());

    if user_repo.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::bad_request("Username already exists"));
    }

    if user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::bad_request("Email already exists"));
    }

    let password_hash = PasswordHasher::new().hash(&req.password)?;

    let user = user_repo.create(&req, &password_hash).await?;

    tracing::info!(username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _principal: Principal,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::new(state.db.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a user. Users may only update themselves.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let user_repo = UserRepository::new(state.db.clone());

    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    if user.username != principal.user.username {
        return Err(AppError::Forbidden);
    }

    let updated = user_repo
        .update(user_id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user. Admins may delete anyone; users may delete themselves.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_repo = UserRepository::new(state.db.clone());

    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    if !(principal.is_admin() || user.username == principal.user.username) {
        return Err(AppError::Forbidden);
    }

    user_repo.delete(user_id).await?;

    tracing::info!(username = %user.username, deleted_by = %principal.user.username, "User deleted");

    Ok(Json(json!({"detail": "User deleted successfully"})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_rejects_negative_values() {
        let pagination = Pagination {
            limit: -1,
            offset: 0,
        };
        assert!(pagination.validate().is_err());

        let pagination = Pagination {
            limit: 50,
            offset: -10,
        };
        assert!(pagination.validate().is_err());
    }

    #[test]
    fn test_pagination_caps_limit() {
        let pagination = Pagination {
            limit: 501,
            offset: 0,
        };
        assert!(pagination.validate().is_err());

        let pagination = Pagination {
            limit: 500,
            offset: 0,
        };
        assert!(pagination.validate().is_ok());
    }
}
