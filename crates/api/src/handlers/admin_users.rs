//! Handlers for tenant user administration.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::error::CoreError;
use lms_core::roles::validate_assignment;
use lms_core::types::DbId;
use lms_db::models::user::UserResponse;
use lms_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

/// GET /api/lms/admin/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_for_tenant(&state.pool, admin.tenant_id()).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// PUT /api/lms/admin/users/{id}/role
///
/// The caller may not grant a role above its own, nor change its own role.
pub async fn assign_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_assignment(&admin.role, &input.role)?;
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot change your own role".into(),
        )));
    }

    let target = UserRepo::find_in_tenant(&state.pool, admin.tenant_id(), id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    // Demoting someone above you is as much an escalation as promoting.
    validate_assignment(&admin.role, &target.role)?;

    let role = RoleRepo::find_by_name(&state.pool, &input.role)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown role '{}'", input.role)))
        })?;

    let updated = UserRepo::update_role(&state.pool, admin.tenant_id(), id, role.id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    tracing::info!(
        tenant_id = admin.tenant_id(),
        actor_id = admin.user_id,
        user_id = id,
        role = %updated.role,
        "Role assigned"
    );
    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// POST /api/lms/admin/users/{id}/deactivate
///
/// Also revokes the user's refresh sessions.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot deactivate your own account".into(),
        )));
    }
    let target = UserRepo::find_in_tenant(&state.pool, admin.tenant_id(), id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    validate_assignment(&admin.role, &target.role)?;

    if !UserRepo::deactivate(&state.pool, admin.tenant_id(), id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "User is already deactivated".into(),
        )));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(tenant_id = admin.tenant_id(), user_id = id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
