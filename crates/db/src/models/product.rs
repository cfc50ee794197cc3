//! Purchasable product models and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub tenant_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub stripe_price_id: String,
    pub price_cents: i64,
    pub currency: String,
    pub billing_interval: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub stripe_price_id: String,
    pub price_cents: i64,
    pub currency: Option<String>,
    pub billing_interval: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// DTO for updating a product. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stripe_price_id: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub billing_interval: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}
