//! Comment repository

use crate::{
    error::AppError,
    models::comment::{Comment, CommentResponse},
};
use sqlx::PgPool;

pub struct CommentRepository {
    db: PgPool,
}

impl CommentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(comment)
    }

    /// Insert a comment, optionally as a reply to `parent_id`
    pub async fn create(
        &self,
        post_id: i64,
        user_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(parent_id)
        .bind(content)
        .fetch_one(&self.db)
        .await?;

        Ok(comment)
    }

    /// All comments for a post, oldest first, with commenter usernames.
    /// Threading is reconstructed by the caller from `parent_id`.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentResponse>, AppError> {
        let comments = sqlx::query_as::<_, CommentResponse>(
            r#"
            SELECT c.id, c.post_id, c.user_id, u.username, c.parent_id,
                   c.content, c.likes_count, c.created_at
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await?;

        Ok(comments)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
