//! Repository for the `video_progress` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::{
    LessonProgressRow, ProgressTotals, ProgressWithVideo, UpsertProgress, VideoProgress,
};

const COLUMNS: &str = "id, tenant_id, user_id, video_id, position_secs, duration_secs, \
                        percent_complete, completed, completed_at, last_watched_at, \
                        created_at, updated_at";

/// Provides progress tracking queries.
pub struct ProgressRepo;

impl ProgressRepo {
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        video_id: DbId,
    ) -> Result<Option<VideoProgress>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM video_progress WHERE user_id = $1 AND video_id = $2");
        sqlx::query_as::<_, VideoProgress>(&query)
            .bind(user_id)
            .bind(video_id)
            .fetch_optional(pool)
            .await
    }

    /// Write merged progress.
    ///
    /// The SQL repeats the furthest-position and sticky-completion rules so
    /// two concurrent reports cannot move progress backwards. `completed_at`
    /// is left alone; [`ProgressRepo::claim_completion`] stamps it.
    pub async fn upsert(pool: &PgPool, input: &UpsertProgress) -> Result<VideoProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_progress (tenant_id, user_id, video_id, position_secs,
                 duration_secs, percent_complete, completed, last_watched_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
             ON CONFLICT (user_id, video_id) DO UPDATE SET
                 position_secs = GREATEST(video_progress.position_secs, EXCLUDED.position_secs),
                 duration_secs = EXCLUDED.duration_secs,
                 percent_complete = GREATEST(video_progress.percent_complete, EXCLUDED.percent_complete),
                 completed = video_progress.completed OR EXCLUDED.completed,
                 last_watched_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoProgress>(&query)
            .bind(input.tenant_id)
            .bind(input.user_id)
            .bind(input.video_id)
            .bind(input.position_secs)
            .bind(input.duration_secs)
            .bind(input.percent_complete)
            .bind(input.completed)
            .fetch_one(pool)
            .await
    }

    /// Stamp `completed_at` on a completed row that has none yet.
    ///
    /// Returns the row only to the caller whose update made the transition.
    /// Concurrent callers block on the row lock and then match zero rows.
    pub async fn claim_completion(
        pool: &PgPool,
        user_id: DbId,
        video_id: DbId,
    ) -> Result<Option<VideoProgress>, sqlx::Error> {
        let query = format!(
            "UPDATE video_progress SET completed_at = NOW()
             WHERE user_id = $1 AND video_id = $2 AND completed AND completed_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoProgress>(&query)
            .bind(user_id)
            .bind(video_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's watched videos in the tenant, most recent first.
    pub async fn list_recent(
        pool: &PgPool,
        tenant_id: DbId,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<ProgressWithVideo>, sqlx::Error> {
        sqlx::query_as::<_, ProgressWithVideo>(
            "SELECT v.id AS video_id, v.title, v.slug, v.thumbnail_url, v.duration_secs,
                    vp.position_secs, vp.percent_complete, vp.completed, vp.last_watched_at
             FROM video_progress vp
             JOIN videos v ON v.id = vp.video_id
             WHERE vp.tenant_id = $1 AND vp.user_id = $2 AND v.is_published = true
             ORDER BY vp.last_watched_at DESC
             LIMIT $3",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Progress rows for the lessons of one program.
    pub async fn for_program(
        pool: &PgPool,
        user_id: DbId,
        program_id: DbId,
    ) -> Result<Vec<LessonProgressRow>, sqlx::Error> {
        sqlx::query_as::<_, LessonProgressRow>(
            "SELECT vp.video_id, vp.percent_complete, vp.completed
             FROM video_progress vp
             JOIN program_lessons pl ON pl.video_id = vp.video_id
             WHERE vp.user_id = $1 AND pl.program_id = $2",
        )
        .bind(user_id)
        .bind(program_id)
        .fetch_all(pool)
        .await
    }

    pub async fn totals(
        pool: &PgPool,
        tenant_id: DbId,
        user_id: DbId,
    ) -> Result<ProgressTotals, sqlx::Error> {
        sqlx::query_as::<_, ProgressTotals>(
            "SELECT COUNT(*) AS videos_started,
                    COUNT(*) FILTER (WHERE completed) AS videos_completed,
                    COALESCE(SUM(position_secs), 0)::DOUBLE PRECISION AS total_watch_secs
             FROM video_progress
             WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Number of published, non-empty programs whose every published lesson
    /// the user has completed.
    pub async fn programs_completed(
        pool: &PgPool,
        tenant_id: DbId,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM (
                 SELECT pl.program_id
                 FROM program_lessons pl
                 JOIN programs p ON p.id = pl.program_id
                 JOIN videos v ON v.id = pl.video_id AND v.is_published = true
                 LEFT JOIN video_progress vp ON vp.video_id = pl.video_id AND vp.user_id = $2
                 WHERE p.tenant_id = $1 AND p.is_published = true
                 GROUP BY pl.program_id
                 HAVING COUNT(*) = COUNT(*) FILTER (WHERE vp.completed)
             ) done",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
