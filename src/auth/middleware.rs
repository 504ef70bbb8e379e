//! Request context resolution
//! Turns a bearer token into a `Principal` for the current request.

use crate::{
    error::AppError,
    middleware::AppState,
    models::user::{User, UserRole, UserStatus},
    repository::UserRepository,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// The resolved identity of the caller, reconstructed per request and
/// attached to the request extensions. Never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub role: UserRole,
    pub status: UserStatus,
}

impl Principal {
    fn from_user(user: User) -> Self {
        let role = user.role();
        let status = user.status();
        Self { user, role, status }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Handlers declare `principal: Principal` to require authentication;
// the middleware below must have run for the extraction to succeed.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// A missing header or any other scheme is rejected.
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .ok_or(AppError::Unauthorized)
}

/// Authentication middleware.
///
/// Verifies the bearer token, loads the user named by its subject, and
/// rejects callers whose account is not active. Every failure path,
/// including a lookup error against the store, surfaces as 401 rather
/// than crashing the pipeline.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    let claims = state
        .token_service
        .verify(&token)
        .map_err(|_| AppError::Unauthorized)?;

    let user = UserRepository::new(state.db.clone())
        .find_by_username(&claims.sub)
        .await
        .map_err(|e| {
            tracing::debug!("User lookup failed during auth: {}", e);
            AppError::Unauthorized
        })?
        .ok_or(AppError::Unauthorized)?;

    // Suspended and deleted accounts fail closed
    if !user.is_active() {
        tracing::debug!(username = %user.username, status = %user.status, "Inactive user rejected");
        return Err(AppError::Unauthorized);
    }

    req.extensions_mut().insert(Principal::from_user(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_valid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        let token = extract_token(&headers).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn test_extract_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn test_extract_token_no_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "test_token_123".parse().unwrap());

        assert!(extract_token(&headers).is_err());
    }
}
