//! Program (ordered course of videos) models and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `programs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub tenant_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub level: Option<String>,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Program row plus lesson aggregates, used by the catalog listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgramSummary {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub level: Option<String>,
    pub lesson_count: i64,
    pub total_duration_secs: i64,
}

/// One lesson of a program: the join row plus the video's display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub position: i32,
    pub video_id: DbId,
    pub title: String,
    pub slug: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: i32,
    pub requires_subscription: bool,
}

/// DTO for creating a program.
#[derive(Debug, Deserialize)]
pub struct CreateProgram {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub level: Option<String>,
    pub is_published: Option<bool>,
}

/// DTO for updating a program. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateProgram {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub level: Option<String>,
    pub is_published: Option<bool>,
}
