//! Handlers for watch progress.

use axum::extract::{Path, Query, State};
use axum::Json;
use lms_core::progress::{self, round1};
use lms_core::search::{clamp_limit, DEFAULT_LIMIT, MAX_LIMIT};
use lms_core::types::DbId;
use lms_db::models::progress::{ProgressWithVideo, UpsertProgress, VideoProgress};
use lms_db::repositories::{ProgressRepo, VideoRepo};
use lms_events::{event_types, PlatformEvent};
use serde::{Deserialize, Serialize};

use super::videos::video_not_found;
use crate::error::AppResult;
use crate::middleware::rbac::TenantUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /videos/{id}/progress`.
#[derive(Debug, Deserialize)]
pub struct ProgressReport {
    pub position_secs: f64,
    /// Player-reported duration; falls back to the stored video duration.
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    #[serde(flatten)]
    pub progress: VideoProgress,
    /// `true` only on the report that first completed the video.
    pub newly_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct ProgressSummary {
    pub videos_started: i64,
    pub videos_completed: i64,
    pub total_watch_secs: f64,
    pub programs_completed: i64,
}

/// POST /api/lms/videos/{id}/progress
pub async fn report(
    State(state): State<AppState>,
    user: TenantUser,
    Path(video_id): Path<DbId>,
    Json(input): Json<ProgressReport>,
) -> AppResult<Json<DataResponse<ProgressResponse>>> {
    let video = VideoRepo::find_published(&state.pool, user.tenant_id(), video_id)
        .await?
        .ok_or_else(|| video_not_found(video_id))?;

    let duration_secs = input
        .duration_secs
        .unwrap_or_else(|| f64::from(video.duration_secs));
    progress::validate_report(input.position_secs, duration_secs)?;

    let previous = ProgressRepo::find(&state.pool, user.user_id, video.id).await?;
    let update = progress::merge(
        previous.as_ref().map(VideoProgress::state),
        input.position_secs,
        duration_secs,
    );

    let stored = ProgressRepo::upsert(
        &state.pool,
        &UpsertProgress {
            tenant_id: user.tenant_id(),
            user_id: user.user_id,
            video_id: video.id,
            position_secs: update.state.position_secs,
            duration_secs,
            percent_complete: update.state.percent_complete,
            completed: update.state.completed,
        },
    )
    .await?;

    // Only the report whose claim stamps `completed_at` announces completion.
    let (stored, newly_completed) = if stored.completed && stored.completed_at.is_none() {
        match ProgressRepo::claim_completion(&state.pool, user.user_id, video.id).await? {
            Some(claimed) => (claimed, true),
            None => (stored, false),
        }
    } else {
        (stored, false)
    };
    if update.newly_completed && !newly_completed {
        tracing::debug!(user_id = user.user_id, video_id = video.id, "Completion already claimed");
    }

    if newly_completed {
        tracing::info!(user_id = user.user_id, video_id = video.id, "Video completed");
        state.event_bus.publish(
            PlatformEvent::new(event_types::VIDEO_COMPLETED, user.tenant_id())
                .with_source("video", video.id)
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({
                    "video_id": video.id,
                    "title": video.title,
                    "slug": video.slug,
                })),
        );
    }

    Ok(Json(DataResponse {
        data: ProgressResponse {
            progress: stored,
            newly_completed,
        },
    }))
}

/// GET /api/lms/progress
///
/// "Continue watching": most recently watched first.
pub async fn list(
    State(state): State<AppState>,
    user: TenantUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ProgressWithVideo>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let rows = ProgressRepo::list_recent(&state.pool, user.tenant_id(), user.user_id, limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/lms/progress/summary
pub async fn summary(
    State(state): State<AppState>,
    user: TenantUser,
) -> AppResult<Json<DataResponse<ProgressSummary>>> {
    let totals = ProgressRepo::totals(&state.pool, user.tenant_id(), user.user_id).await?;
    let programs_completed =
        ProgressRepo::programs_completed(&state.pool, user.tenant_id(), user.user_id).await?;
    Ok(Json(DataResponse {
        data: ProgressSummary {
            videos_started: totals.videos_started,
            videos_completed: totals.videos_completed,
            total_watch_secs: round1(totals.total_watch_secs),
            programs_completed,
        },
    }))
}
