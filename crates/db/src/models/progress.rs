//! Video progress models.

use lms_core::progress::ProgressState;
use lms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `video_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoProgress {
    pub id: DbId,
    pub tenant_id: DbId,
    pub user_id: DbId,
    pub video_id: DbId,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub percent_complete: f64,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub last_watched_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VideoProgress {
    pub fn state(&self) -> ProgressState {
        ProgressState {
            position_secs: self.position_secs,
            percent_complete: self.percent_complete,
            completed: self.completed,
        }
    }
}

/// DTO for writing merged progress.
#[derive(Debug)]
pub struct UpsertProgress {
    pub tenant_id: DbId,
    pub user_id: DbId,
    pub video_id: DbId,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub percent_complete: f64,
    pub completed: bool,
}

/// Progress joined with video display fields for "continue watching".
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressWithVideo {
    pub video_id: DbId,
    pub title: String,
    pub slug: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: i32,
    pub position_secs: f64,
    pub percent_complete: f64,
    pub completed: bool,
    pub last_watched_at: Timestamp,
}

/// Per-user progress for one lesson of a program.
#[derive(Debug, Clone, FromRow)]
pub struct LessonProgressRow {
    pub video_id: DbId,
    pub percent_complete: f64,
    pub completed: bool,
}

/// Totals for a user's progress summary.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressTotals {
    pub videos_started: i64,
    pub videos_completed: i64,
    pub total_watch_secs: f64,
}
