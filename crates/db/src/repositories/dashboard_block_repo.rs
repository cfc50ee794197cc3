//! Repository for the `dashboard_blocks` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{CreateDashboardBlock, DashboardBlock, UpdateDashboardBlock};

const COLUMNS: &str = "id, tenant_id, block_type, title, content, position, is_published, \
                        created_at, updated_at";

/// Provides CRUD and ordering for a tenant's dashboard blocks.
pub struct DashboardBlockRepo;

impl DashboardBlockRepo {
    /// Insert a block; without an explicit position it is appended last.
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        input: &CreateDashboardBlock,
    ) -> Result<DashboardBlock, sqlx::Error> {
        let query = format!(
            "INSERT INTO dashboard_blocks (tenant_id, block_type, title, content, position,
                 is_published)
             VALUES ($1, $2, $3, $4,
                 COALESCE($5, (SELECT COALESCE(MAX(position) + 1, 0)
                               FROM dashboard_blocks WHERE tenant_id = $1)),
                 COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DashboardBlock>(&query)
            .bind(tenant_id)
            .bind(&input.block_type)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.position)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<DashboardBlock>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM dashboard_blocks WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, DashboardBlock>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Published blocks in display order.
    pub async fn list_published(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Vec<DashboardBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dashboard_blocks
             WHERE tenant_id = $1 AND is_published = true
             ORDER BY position, id"
        );
        sqlx::query_as::<_, DashboardBlock>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Vec<DashboardBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dashboard_blocks WHERE tenant_id = $1 ORDER BY position, id"
        );
        sqlx::query_as::<_, DashboardBlock>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn ids_for_tenant(pool: &PgPool, tenant_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM dashboard_blocks WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        input: &UpdateDashboardBlock,
    ) -> Result<Option<DashboardBlock>, sqlx::Error> {
        let query = format!(
            "UPDATE dashboard_blocks SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                is_published = COALESCE($5, is_published)
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DashboardBlock>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Rewrite positions to match the order of `ids` (0-based).
    pub async fn reorder(pool: &PgPool, tenant_id: DbId, ids: &[DbId]) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE dashboard_blocks d SET position = (t.ord - 1)::INTEGER
             FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS t(id, ord)
             WHERE d.id = t.id AND d.tenant_id = $1",
        )
        .bind(tenant_id)
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dashboard_blocks WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
