//! Handlers for the caller's own profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use lms_core::branding::is_http_url;
use lms_core::error::CoreError;
use lms_db::models::user::{UpdateProfile, UserResponse};
use lms_db::repositories::{SessionRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::TenantUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Request body for `PUT /me/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn user_gone() -> AppError {
    AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
}

/// GET /api/lms/me
pub async fn me(
    State(state): State<AppState>,
    user: TenantUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(user_gone)?;
    Ok(Json(DataResponse { data: row.into() }))
}

/// PUT /api/lms/me
pub async fn update(
    State(state): State<AppState>,
    user: TenantUser,
    Json(mut input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(name) = input.display_name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(AppError::Core(CoreError::Validation(format!(
                "display_name must be 1-{MAX_DISPLAY_NAME_LEN} characters"
            ))));
        }
    }
    if let Some(url) = &input.avatar_url {
        if !is_http_url(url) {
            return Err(AppError::Core(CoreError::Validation(
                "avatar_url must be an http(s) URL".into(),
            )));
        }
    }

    let row = UserRepo::update_profile(&state.pool, user.user_id, &input)
        .await?
        .ok_or_else(user_gone)?;
    Ok(Json(DataResponse { data: row.into() }))
}

/// PUT /api/lms/me/password
///
/// Revokes every refresh session so other devices must sign in again.
pub async fn change_password(
    State(state): State<AppState>,
    user: TenantUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(user_gone)?;

    let current_ok = verify_password(&input.current_password, &row.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_ok {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, row.id, &hash).await?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, row.id).await?;
    tracing::info!(user_id = row.id, revoked, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}
