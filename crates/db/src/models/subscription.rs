//! Subscription models and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub tenant_id: DbId,
    pub user_id: DbId,
    pub product_id: Option<DbId>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub status: String,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO applied when a checkout completes.
#[derive(Debug)]
pub struct ActivateSubscription {
    pub tenant_id: DbId,
    pub user_id: DbId,
    pub product_id: Option<DbId>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub status: String,
}

/// DTO applied when the processor reports a subscription change.
#[derive(Debug)]
pub struct SyncSubscription {
    pub stripe_subscription_id: String,
    pub status: String,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
}
