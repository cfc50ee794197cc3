//! Video catalog models and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub tenant_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub playback_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: i32,
    pub category: Option<String>,
    pub requires_subscription: bool,
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a video. `slug` is derived from the title when omitted.
#[derive(Debug, Deserialize)]
pub struct CreateVideo {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub playback_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<i32>,
    pub category: Option<String>,
    pub requires_subscription: Option<bool>,
    pub is_published: Option<bool>,
}

/// DTO for updating a video. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub playback_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<i32>,
    pub category: Option<String>,
    pub requires_subscription: Option<bool>,
    pub is_published: Option<bool>,
}

/// Filters for listing published videos.
#[derive(Debug, Default)]
pub struct VideoFilter {
    pub category: Option<String>,
    /// Pre-escaped `ILIKE` pattern.
    pub search_pattern: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Aggregated viewing statistics for one video.
#[derive(Debug, Clone, FromRow)]
pub struct VideoStatsRow {
    pub viewers: i64,
    pub completions: i64,
    pub average_percent: f64,
    pub total_watch_secs: f64,
    pub comment_count: i64,
}
