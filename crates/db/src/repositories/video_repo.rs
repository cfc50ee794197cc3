//! Repository for the `videos` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::video::{CreateVideo, UpdateVideo, Video, VideoFilter, VideoStatsRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, title, slug, description, playback_url, thumbnail_url, \
                        duration_secs, category, requires_subscription, is_published, \
                        published_at, created_by, created_at, updated_at";

/// Provides tenant-scoped CRUD and statistics for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a video. `slug` has already been resolved by the caller.
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        created_by: DbId,
        slug: &str,
        input: &CreateVideo,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (tenant_id, title, slug, description, playback_url, thumbnail_url,
                 duration_secs, category, requires_subscription, is_published, published_at,
                 created_by)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 0), $8, COALESCE($9, false),
                 COALESCE($10, false), CASE WHEN COALESCE($10, false) THEN NOW() END, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(tenant_id)
            .bind(input.title.trim())
            .bind(slug)
            .bind(&input.description)
            .bind(&input.playback_url)
            .bind(&input.thumbnail_url)
            .bind(input.duration_secs)
            .bind(&input.category)
            .bind(input.requires_subscription)
            .bind(input.is_published)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a video in the tenant regardless of publish state.
    pub async fn find_in_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published video in the tenant.
    pub async fn find_published(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE id = $1 AND tenant_id = $2 AND is_published = true"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List published videos, newest first, with optional category and
    /// title/description search.
    pub async fn list_published(
        pool: &PgPool,
        tenant_id: DbId,
        filter: &VideoFilter,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE tenant_id = $1
               AND is_published = true
               AND ($2::TEXT IS NULL OR category = $2)
               AND ($3::TEXT IS NULL OR title ILIKE $3 OR description ILIKE $3)
             ORDER BY published_at DESC NULLS LAST, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(tenant_id)
            .bind(&filter.category)
            .bind(&filter.search_pattern)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// List every video in the tenant (drafts included) for editors.
    pub async fn list_all(pool: &PgPool, tenant_id: DbId) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos WHERE tenant_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Patch a video. `published_at` is stamped the first time it is published.
    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        slug: Option<&str>,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                title = COALESCE($3, title),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                playback_url = COALESCE($6, playback_url),
                thumbnail_url = COALESCE($7, thumbnail_url),
                duration_secs = COALESCE($8, duration_secs),
                category = COALESCE($9, category),
                requires_subscription = COALESCE($10, requires_subscription),
                is_published = COALESCE($11, is_published),
                published_at = CASE
                    WHEN COALESCE($11, is_published) AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(slug)
            .bind(&input.description)
            .bind(&input.playback_url)
            .bind(&input.thumbnail_url)
            .bind(input.duration_secs)
            .bind(&input.category)
            .bind(input.requires_subscription)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Delete a video. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count how many of `ids` belong to the tenant.
    pub async fn count_in_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        ids: &[DbId],
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM videos WHERE tenant_id = $1 AND id = ANY($2)",
        )
        .bind(tenant_id)
        .bind(ids)
        .fetch_one(pool)
        .await
    }

    /// Aggregate viewing statistics for a video.
    pub async fn stats(pool: &PgPool, video_id: DbId) -> Result<VideoStatsRow, sqlx::Error> {
        sqlx::query_as::<_, VideoStatsRow>(
            "SELECT
                 COUNT(vp.id) AS viewers,
                 COUNT(vp.id) FILTER (WHERE vp.completed) AS completions,
                 COALESCE(AVG(vp.percent_complete), 0)::DOUBLE PRECISION AS average_percent,
                 COALESCE(SUM(vp.position_secs), 0)::DOUBLE PRECISION AS total_watch_secs,
                 (SELECT COUNT(*) FROM comments c WHERE c.video_id = $1) AS comment_count
             FROM video_progress vp
             WHERE vp.video_id = $1",
        )
        .bind(video_id)
        .fetch_one(pool)
        .await
    }
}
