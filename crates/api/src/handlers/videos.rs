//! Handlers for the `/videos` catalog and its admin CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::billing::status_grants_access;
use lms_core::branding::is_http_url;
use lms_core::catalog::{resolve_slug, validate_title};
use lms_core::error::CoreError;
use lms_core::formatting::duration_label;
use lms_core::progress::{percentage, round1};
use lms_core::roles::ROLE_INSTRUCTOR;
use lms_core::search::{clamp_limit, clamp_offset, like_pattern, DEFAULT_LIMIT, MAX_LIMIT};
use lms_core::types::{DbId, Timestamp};
use lms_db::models::progress::VideoProgress;
use lms_db::models::video::{CreateVideo, UpdateVideo, Video, VideoFilter};
use lms_db::repositories::{ProgressRepo, SubscriptionRepo, VideoRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireInstructor, TenantUser};
use crate::middleware::tenant::CurrentTenant;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /videos`.
#[derive(Debug, Deserialize)]
pub struct VideoListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Catalog card. Never carries the playback URL.
#[derive(Debug, Serialize)]
pub struct VideoCard {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_secs: i32,
    pub duration_label: String,
    pub category: Option<String>,
    pub requires_subscription: bool,
    pub published_at: Option<Timestamp>,
}

impl From<Video> for VideoCard {
    fn from(v: Video) -> Self {
        Self {
            duration_label: duration_label(i64::from(v.duration_secs)),
            id: v.id,
            title: v.title,
            slug: v.slug,
            description: v.description,
            thumbnail_url: v.thumbnail_url,
            duration_secs: v.duration_secs,
            category: v.category,
            requires_subscription: v.requires_subscription,
            published_at: v.published_at,
        }
    }
}

/// Single video as seen by the caller.
#[derive(Debug, Serialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub card: VideoCard,
    /// `None` when the caller may not watch this video.
    pub playback_url: Option<String>,
    pub locked: bool,
    /// The caller's progress, when signed in and started.
    pub progress: Option<VideoProgress>,
}

#[derive(Debug, Serialize)]
pub struct VideoStats {
    pub video_id: DbId,
    pub viewers: i64,
    pub completions: i64,
    /// Completions over viewers, in percent.
    pub completion_rate: f64,
    pub average_percent: f64,
    pub comment_count: i64,
    pub total_watch_secs: f64,
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Whether `user` may watch `video`.
///
/// Free videos are open to everyone. Subscriber videos need a signed-in
/// caller who is instructor+ or holds an active/trialing subscription.
pub(crate) async fn can_watch(
    state: &AppState,
    user: Option<&TenantUser>,
    video: &Video,
) -> AppResult<bool> {
    if !video.requires_subscription {
        return Ok(true);
    }
    let Some(user) = user else {
        return Ok(false);
    };
    if user.is_at_least(ROLE_INSTRUCTOR) {
        return Ok(true);
    }
    let subscription =
        SubscriptionRepo::find_for_user(&state.pool, user.tenant_id(), user.user_id).await?;
    Ok(subscription.is_some_and(|s| status_grants_access(&s.status)))
}

pub(crate) fn video_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Video", id })
}

fn validate_media(playback_url: Option<&str>, duration_secs: Option<i32>) -> AppResult<()> {
    if let Some(url) = playback_url {
        if !is_http_url(url) {
            return Err(AppError::Core(CoreError::Validation(
                "playback_url must be an http(s) URL".into(),
            )));
        }
    }
    if duration_secs.is_some_and(|d| d < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "duration_secs must not be negative".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// GET /api/lms/videos
///
/// Published videos of the tenant, newest first.
pub async fn list(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Query(params): Query<VideoListParams>,
) -> AppResult<Json<DataResponse<Vec<VideoCard>>>> {
    let filter = VideoFilter {
        category: params
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        search_pattern: like_pattern(params.search.as_deref())?,
        limit: clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        offset: clamp_offset(params.offset),
    };
    let videos = VideoRepo::list_published(&state.pool, tenant.id, &filter).await?;
    Ok(Json(DataResponse {
        data: videos.into_iter().map(VideoCard::from).collect(),
    }))
}

/// GET /api/lms/videos/{id}
///
/// Subscriber-only videos come back `locked` with no playback URL unless
/// the caller has access.
pub async fn get_by_id(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    user: Option<TenantUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VideoDetail>>> {
    let video = VideoRepo::find_published(&state.pool, tenant.id, id)
        .await?
        .ok_or_else(|| video_not_found(id))?;

    let allowed = can_watch(&state, user.as_ref(), &video).await?;
    let progress = match &user {
        Some(u) => ProgressRepo::find(&state.pool, u.user_id, video.id).await?,
        None => None,
    };

    let playback_url = allowed.then(|| video.playback_url.clone());
    Ok(Json(DataResponse {
        data: VideoDetail {
            card: VideoCard::from(video),
            playback_url,
            locked: !allowed,
            progress,
        },
    }))
}

/// GET /api/lms/videos/{id}/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VideoStats>>> {
    let video = VideoRepo::find_in_tenant(&state.pool, user.tenant_id(), id)
        .await?
        .ok_or_else(|| video_not_found(id))?;

    let row = VideoRepo::stats(&state.pool, video.id).await?;
    Ok(Json(DataResponse {
        data: VideoStats {
            video_id: video.id,
            viewers: row.viewers,
            completions: row.completions,
            completion_rate: percentage(row.completions, row.viewers),
            average_percent: round1(row.average_percent),
            comment_count: row.comment_count,
            total_watch_secs: row.total_watch_secs.round(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/lms/admin/videos
///
/// Every video of the tenant, drafts included.
pub async fn admin_list(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
) -> AppResult<Json<DataResponse<Vec<Video>>>> {
    let videos = VideoRepo::list_all(&state.pool, user.tenant_id()).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// POST /api/lms/admin/videos
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateVideo>,
) -> AppResult<(StatusCode, Json<DataResponse<Video>>)> {
    validate_title(&input.title)?;
    validate_media(Some(&input.playback_url), input.duration_secs)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.title)?;

    let video =
        VideoRepo::create(&state.pool, user.tenant_id(), user.user_id, &slug, &input).await?;
    tracing::info!(video_id = video.id, tenant_id = video.tenant_id, "Video created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: video })))
}

/// PUT /api/lms/admin/videos/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVideo>,
) -> AppResult<Json<DataResponse<Video>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    validate_media(input.playback_url.as_deref(), input.duration_secs)?;
    let slug = match input.slug.as_deref() {
        Some(s) => Some(resolve_slug(Some(s), "")?),
        None => None,
    };

    let video = VideoRepo::update(&state.pool, user.tenant_id(), id, slug.as_deref(), &input)
        .await?
        .ok_or_else(|| video_not_found(id))?;
    Ok(Json(DataResponse { data: video }))
}

/// DELETE /api/lms/admin/videos/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if VideoRepo::delete(&state.pool, user.tenant_id(), id).await? {
        tracing::info!(video_id = id, tenant_id = user.tenant_id(), "Video deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(video_not_found(id))
    }
}
