//! Post repository

use crate::{
    error::AppError,
    models::post::{CreatePostRequest, Post, PostWithAuthor, UpdatePostRequest},
};
use sqlx::PgPool;

pub struct PostRepository {
    db: PgPool,
}

impl PostRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch a post with its author's username
    pub async fn find_by_id(&self, id: i64) -> Result<Option<PostWithAuthor>, AppError> {
        let post = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.*, u.username AS author_name
            FROM posts p
            JOIN users u ON p.author_id = u.id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(post)
    }

    /// Insert a new post for the given author
    pub async fn create(
        &self,
        author_id: i64,
        req: &CreatePostRequest,
    ) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, author_id, view_count, is_featured,
                               allow_comments, likes_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(author_id)
        .bind(req.view_count.unwrap_or(0))
        .bind(req.is_featured.unwrap_or(false))
        .bind(req.allow_comments.unwrap_or(true))
        .bind(req.likes_count.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        Ok(post)
    }

    /// Update a post, keeping unset fields
    pub async fn update(&self, id: i64, req: &UpdatePostRequest) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                view_count = COALESCE($4, view_count),
                is_featured = COALESCE($5, is_featured),
                allow_comments = COALESCE($6, allow_comments),
                likes_count = COALESCE($7, likes_count),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.view_count)
        .bind(req.is_featured)
        .bind(req.allow_comments)
        .bind(req.likes_count)
        .fetch_optional(&self.db)
        .await?;

        Ok(post)
    }

    /// Delete a post
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List posts with author names, newest first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<PostWithAuthor>, AppError> {
        let posts = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            SELECT p.*, u.username AS author_name
            FROM posts p
            JOIN users u ON p.author_id = u.id
            ORDER BY p.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(posts)
    }
}
