//! Comment domain models
//! Comments are threaded via `parent_id` self-reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Comment on a post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 4096))]
    pub content: String,
    /// Parent comment for threaded replies; must belong to the same post
    pub parent_id: Option<i64>,
}

/// Comment response, with the commenter's username
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub parent_id: Option<i64>,
    pub content: String,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}
