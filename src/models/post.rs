//! Post domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub view_count: i64,
    pub is_featured: bool,
    pub allow_comments: bool,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author's username
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithAuthor {
    #[sqlx(flatten)]
    pub post: Post,
    pub author_name: String,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub view_count: Option<i64>,
    pub is_featured: Option<bool>,
    pub allow_comments: Option<bool>,
    pub likes_count: Option<i64>,
}

/// Update post request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub view_count: Option<i64>,
    pub is_featured: Option<bool>,
    pub allow_comments: Option<bool>,
    pub likes_count: Option<i64>,
}

/// Post response
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_name: String,
    pub view_count: i64,
    pub is_featured: bool,
    pub allow_comments: bool,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostWithAuthor> for PostResponse {
    fn from(row: PostWithAuthor) -> Self {
        Self {
            id: row.post.id,
            title: row.post.title,
            content: row.post.content,
            author_id: row.post.author_id,
            author_name: row.author_name,
            view_count: row.post.view_count,
            is_featured: row.post.is_featured,
            allow_comments: row.post.allow_comments,
            likes_count: row.post.likes_count,
            created_at: row.post.created_at,
            updated_at: row.post.updated_at,
        }
    }
}
