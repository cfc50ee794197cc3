//! Video comment models.

use lms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub tenant_id: DbId,
    pub video_id: DbId,
    pub user_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Comment joined with its author's display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentWithAuthor {
    pub id: DbId,
    pub video_id: DbId,
    pub user_id: DbId,
    pub body: String,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a comment (body already normalized).
#[derive(Debug)]
pub struct CreateComment {
    pub tenant_id: DbId,
    pub video_id: DbId,
    pub user_id: DbId,
    pub body: String,
}
