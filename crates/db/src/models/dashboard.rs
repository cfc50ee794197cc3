//! Dashboard content block models and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `dashboard_blocks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardBlock {
    pub id: DbId,
    pub tenant_id: DbId,
    pub block_type: String,
    pub title: Option<String>,
    pub content: serde_json::Value,
    pub position: i32,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a block. Appended at the end when `position` is omitted.
#[derive(Debug, Deserialize)]
pub struct CreateDashboardBlock {
    pub block_type: String,
    pub title: Option<String>,
    pub content: serde_json::Value,
    pub position: Option<i32>,
    pub is_published: Option<bool>,
}

/// DTO for updating a block. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateDashboardBlock {
    pub title: Option<String>,
    pub content: Option<serde_json::Value>,
    pub is_published: Option<bool>,
}
