//! Repository for the `comments` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CommentWithAuthor, CreateComment};

const COLUMNS: &str = "id, tenant_id, video_id, user_id, body, created_at, updated_at";

/// Provides operations on video comment threads.
pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (tenant_id, video_id, user_id, body)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.tenant_id)
            .bind(input.video_id)
            .bind(input.user_id)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Oldest-first page of a video's thread with author details.
    pub async fn list_for_video(
        pool: &PgPool,
        video_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.id, c.video_id, c.user_id, c.body,
                    u.display_name AS author_name, u.avatar_url AS author_avatar_url,
                    c.created_at
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.video_id = $1
             ORDER BY c.created_at, c.id
             LIMIT $2 OFFSET $3",
        )
        .bind(video_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_video(pool: &PgPool, video_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(pool)
            .await
    }

    /// Delete a comment. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
