//! Authentication handlers

use crate::{
    error::AppError,
    middleware::AppState,
    models::auth::{LoginRequest, TokenResponse},
};
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// Token issuance endpoint.
///
/// Unknown user and wrong password produce the same 401; the error's
/// response carries the `WWW-Authenticate: Bearer` challenge.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth_service
        .authenticate(&req.username, &req.password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let access_token = state.auth_service.issue_session(&user)?;

    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(TokenResponse::bearer(access_token)))
}
