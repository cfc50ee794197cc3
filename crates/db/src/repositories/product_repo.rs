//! Repository for the `products` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{CreateProduct, Product, UpdateProduct};

const COLUMNS: &str = "id, tenant_id, name, description, stripe_price_id, price_cents, currency, \
                        billing_interval, is_active, sort_order, created_at, updated_at";

/// Provides tenant-scoped CRUD for products.
pub struct ProductRepo;

impl ProductRepo {
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        input: &CreateProduct,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (tenant_id, name, description, stripe_price_id, price_cents,
                 currency, billing_interval, is_active, sort_order)
             VALUES ($1, $2, $3, $4, $5, LOWER(COALESCE($6, 'usd')), COALESCE($7, 'month'),
                 COALESCE($8, true), COALESCE($9, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.stripe_price_id)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.billing_interval)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_in_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Active products for the pricing page.
    pub async fn list_active(pool: &PgPool, tenant_id: DbId) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE tenant_id = $1 AND is_active = true
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool, tenant_id: DbId) -> Result<Vec<Product>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM products WHERE tenant_id = $1 ORDER BY sort_order, id");
        sqlx::query_as::<_, Product>(&query)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                stripe_price_id = COALESCE($5, stripe_price_id),
                price_cents = COALESCE($6, price_cents),
                currency = LOWER(COALESCE($7, currency)),
                billing_interval = COALESCE($8, billing_interval),
                is_active = COALESCE($9, is_active),
                sort_order = COALESCE($10, sort_order)
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.stripe_price_id)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.billing_interval)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
