//! Handlers for the caller's notification feed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::error::CoreError;
use lms_core::search::clamp_limit;
use lms_core::types::DbId;
use lms_db::models::notification::Notification;
use lms_db::repositories::NotificationRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::TenantUser;
use crate::state::AppState;

const DEFAULT_FEED_LIMIT: i64 = 20;
const MAX_FEED_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// Feed envelope: items plus the unread badge count.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub data: Vec<Notification>,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// GET /api/lms/notifications
pub async fn list(
    State(state): State<AppState>,
    user: TenantUser,
    Query(params): Query<FeedParams>,
) -> AppResult<Json<FeedResponse>> {
    let limit = clamp_limit(params.limit, DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT);
    let data =
        NotificationRepo::list_for_user(&state.pool, user.user_id, params.unread_only, limit)
            .await?;
    let unread_count = NotificationRepo::unread_count(&state.pool, user.user_id).await?;
    Ok(Json(FeedResponse { data, unread_count }))
}

/// POST /api/lms/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: TenantUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if NotificationRepo::mark_read(&state.pool, user.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }))
    }
}

/// POST /api/lms/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: TenantUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let updated = NotificationRepo::mark_all_read(&state.pool, user.user_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
