//! Authentication service: credential checks and session issuance

use crate::{
    auth::{PasswordHasher, TokenService},
    error::AppError,
    models::user::User,
    repository::UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

pub struct AuthService {
    db: PgPool,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(db: PgPool, token_service: Arc<TokenService>) -> Self {
        Self { db, token_service }
    }

    /// Verify a username/password pair.
    ///
    /// Returns None for an unknown username, a wrong password, and a
    /// non-active account alike: callers cannot tell which check
    /// failed, so the login endpoint cannot be used to enumerate
    /// usernames. Store errors still propagate.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        let Some(user) = user_repo.find_by_username(username).await? else {
            tracing::debug!(username, "Login attempt for unknown user");
            return Ok(None);
        };

        let hasher = PasswordHasher::new();
        if !hasher.verify(password, &user.password_hash) {
            tracing::debug!(username, "Login attempt with wrong password");
            return Ok(None);
        }

        // Only active accounts may authenticate
        if !user.is_active() {
            tracing::debug!(username, status = %user.status, "Login attempt for inactive user");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Issue a bearer token for an authenticated user
    pub fn issue_session(&self, user: &User) -> Result<String, AppError> {
        self.token_service.issue(&user.username)
    }
}
