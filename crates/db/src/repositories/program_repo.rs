//! Repository for the `programs` and `program_lessons` tables.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::program::{CreateProgram, Lesson, Program, ProgramSummary, UpdateProgram};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, title, slug, description, cover_image_url, level, \
                        is_published, created_at, updated_at";

/// Provides tenant-scoped CRUD for programs and their ordered lessons.
pub struct ProgramRepo;

impl ProgramRepo {
    /// Insert a program. `slug` has already been resolved by the caller.
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        slug: &str,
        input: &CreateProgram,
    ) -> Result<Program, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs (tenant_id, title, slug, description, cover_image_url, level,
                 is_published)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(tenant_id)
            .bind(input.title.trim())
            .bind(slug)
            .bind(&input.description)
            .bind(&input.cover_image_url)
            .bind(&input.level)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    /// Find a program in the tenant regardless of publish state.
    pub async fn find_in_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published program in the tenant.
    pub async fn find_published(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM programs
             WHERE id = $1 AND tenant_id = $2 AND is_published = true"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List published programs with counts over their published lessons.
    pub async fn list_published_summaries(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Vec<ProgramSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProgramSummary>(
            "SELECT p.id, p.title, p.slug, p.description, p.cover_image_url, p.level,
                    COUNT(v.id) AS lesson_count,
                    COALESCE(SUM(v.duration_secs), 0)::BIGINT AS total_duration_secs
             FROM programs p
             LEFT JOIN program_lessons pl ON pl.program_id = p.id
             LEFT JOIN videos v ON v.id = pl.video_id AND v.is_published = true
             WHERE p.tenant_id = $1 AND p.is_published = true
             GROUP BY p.id
             ORDER BY p.title",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }

    /// List every program in the tenant for editors.
    pub async fn list_all(pool: &PgPool, tenant_id: DbId) -> Result<Vec<Program>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM programs WHERE tenant_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Program>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// Ordered lessons of a program. With `published_only`, draft videos are skipped.
    pub async fn lessons(
        pool: &PgPool,
        program_id: DbId,
        published_only: bool,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            "SELECT pl.position, v.id AS video_id, v.title, v.slug, v.thumbnail_url,
                    v.duration_secs, v.requires_subscription
             FROM program_lessons pl
             JOIN videos v ON v.id = pl.video_id
             WHERE pl.program_id = $1 AND ($2 = false OR v.is_published = true)
             ORDER BY pl.position",
        )
        .bind(program_id)
        .bind(published_only)
        .fetch_all(pool)
        .await
    }

    /// Replace the ordered lesson list of a program atomically.
    pub async fn replace_lessons(
        pool: &PgPool,
        program_id: DbId,
        video_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM program_lessons WHERE program_id = $1")
            .bind(program_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO program_lessons (program_id, video_id, position)
             SELECT $1, t.video_id, (t.ord - 1)::INTEGER
             FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS t(video_id, ord)",
        )
        .bind(program_id)
        .bind(video_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// Patch a program. Only non-`None` fields are written.
    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        slug: Option<&str>,
        input: &UpdateProgram,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "UPDATE programs SET
                title = COALESCE($3, title),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                cover_image_url = COALESCE($6, cover_image_url),
                level = COALESCE($7, level),
                is_published = COALESCE($8, is_published)
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(slug)
            .bind(&input.description)
            .bind(&input.cover_image_url)
            .bind(&input.level)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Delete a program (lessons cascade). Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
