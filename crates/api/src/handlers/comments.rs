//! Handlers for video comment threads.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use lms_core::catalog::normalize_comment;
use lms_core::error::CoreError;
use lms_core::formatting::relative_label;
use lms_core::roles::ROLE_INSTRUCTOR;
use lms_core::search::{clamp_limit, clamp_offset, MAX_LIMIT};
use lms_core::types::{DbId, Timestamp};
use lms_db::models::comment::{Comment, CommentWithAuthor, CreateComment};
use lms_db::repositories::{CommentRepo, UserRepo, VideoRepo};
use lms_events::{event_types, PlatformEvent};
use serde::{Deserialize, Serialize};

use super::videos::video_not_found;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::TenantUser;
use crate::middleware::tenant::CurrentTenant;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

const DEFAULT_PAGE: i64 = 50;
const EXCERPT_CHARS: usize = 140;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// Comment with a display-ready relative timestamp.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: DbId,
    pub video_id: DbId,
    pub user_id: DbId,
    pub body: String,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub created_label: String,
}

impl CommentView {
    fn new(c: CommentWithAuthor, now: Timestamp) -> Self {
        Self {
            created_label: relative_label(c.created_at, now),
            id: c.id,
            video_id: c.video_id,
            user_id: c.user_id,
            body: c.body,
            author_name: c.author_name,
            author_avatar_url: c.author_avatar_url,
            created_at: c.created_at,
        }
    }
}

/// GET /api/lms/videos/{id}/comments
///
/// Oldest first.
pub async fn list(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Path(video_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PagedResponse<CommentView>>> {
    let video = VideoRepo::find_published(&state.pool, tenant.id, video_id)
        .await?
        .ok_or_else(|| video_not_found(video_id))?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let rows = CommentRepo::list_for_video(&state.pool, video.id, limit, offset).await?;
    let total = CommentRepo::count_for_video(&state.pool, video.id).await?;

    let now = Utc::now();
    Ok(Json(PagedResponse {
        data: rows.into_iter().map(|c| CommentView::new(c, now)).collect(),
        total,
        limit,
        offset,
    }))
}

/// POST /api/lms/videos/{id}/comments
///
/// Publishes `comment.created` so the video's author is notified.
pub async fn create(
    State(state): State<AppState>,
    user: TenantUser,
    Path(video_id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    let body = normalize_comment(&input.body)?;
    let video = VideoRepo::find_published(&state.pool, user.tenant_id(), video_id)
        .await?
        .ok_or_else(|| video_not_found(video_id))?;

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            tenant_id: user.tenant_id(),
            video_id: video.id,
            user_id: user.user_id,
            body,
        },
    )
    .await?;

    let author_name = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .map(|u| u.display_name)
        .unwrap_or_default();
    let excerpt: String = comment.body.chars().take(EXCERPT_CHARS).collect();

    state.event_bus.publish(
        PlatformEvent::new(event_types::COMMENT_CREATED, user.tenant_id())
            .with_source("comment", comment.id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({
                "video_id": video.id,
                "comment_id": comment.id,
                "author_name": author_name,
                "excerpt": excerpt,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// DELETE /api/lms/comments/{id}
///
/// Allowed for the author and for instructors and above.
pub async fn delete(
    State(state): State<AppState>,
    user: TenantUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = CommentRepo::find_in_tenant(&state.pool, user.tenant_id(), id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;

    if comment.user_id != user.user_id && !user.is_at_least(ROLE_INSTRUCTOR) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author or an instructor may delete this comment".into(),
        )));
    }

    CommentRepo::delete(&state.pool, comment.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
