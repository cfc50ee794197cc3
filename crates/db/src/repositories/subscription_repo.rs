//! Repository for the `subscriptions` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::{ActivateSubscription, Subscription, SyncSubscription};

const COLUMNS: &str = "id, tenant_id, user_id, product_id, stripe_customer_id, \
                        stripe_subscription_id, status, current_period_end, \
                        cancel_at_period_end, created_at, updated_at";

/// Provides subscription state persistence.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    pub async fn find_for_user(
        pool: &PgPool,
        tenant_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE tenant_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(tenant_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or overwrite the user's subscription after a completed checkout.
    ///
    /// Existing processor ids are kept when the checkout did not carry one.
    pub async fn activate(
        pool: &PgPool,
        input: &ActivateSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (tenant_id, user_id, product_id, stripe_customer_id,
                 stripe_subscription_id, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (tenant_id, user_id) DO UPDATE SET
                 product_id = COALESCE(EXCLUDED.product_id, subscriptions.product_id),
                 stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id, subscriptions.stripe_customer_id),
                 stripe_subscription_id = COALESCE(EXCLUDED.stripe_subscription_id, subscriptions.stripe_subscription_id),
                 status = EXCLUDED.status,
                 cancel_at_period_end = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.tenant_id)
            .bind(input.user_id)
            .bind(input.product_id)
            .bind(&input.stripe_customer_id)
            .bind(&input.stripe_subscription_id)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Apply a processor-side change. Returns `None` for unknown subscriptions.
    pub async fn sync(
        pool: &PgPool,
        input: &SyncSubscription,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET
                 status = $2,
                 current_period_end = COALESCE($3, current_period_end),
                 cancel_at_period_end = $4
             WHERE stripe_subscription_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(&input.stripe_subscription_id)
            .bind(&input.status)
            .bind(input.current_period_end)
            .bind(input.cancel_at_period_end)
            .fetch_optional(pool)
            .await
    }
}
