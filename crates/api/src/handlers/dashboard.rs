//! Handlers for the tenant dashboard and its editable blocks.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::blocks::{validate_content, validate_reorder};
use lms_core::error::CoreError;
use lms_core::types::DbId;
use lms_db::models::dashboard::{CreateDashboardBlock, DashboardBlock, UpdateDashboardBlock};
use lms_db::repositories::DashboardBlockRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::tenant::CurrentTenant;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/dashboard-blocks/order`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<DbId>,
}

fn block_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "DashboardBlock",
        id,
    })
}

/// GET /api/lms/dashboard
pub async fn list(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
) -> AppResult<Json<DataResponse<Vec<DashboardBlock>>>> {
    let blocks = DashboardBlockRepo::list_published(&state.pool, tenant.id).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// GET /api/lms/admin/dashboard-blocks
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<DashboardBlock>>>> {
    let blocks = DashboardBlockRepo::list_all(&state.pool, admin.tenant_id()).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// POST /api/lms/admin/dashboard-blocks
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateDashboardBlock>,
) -> AppResult<(StatusCode, Json<DataResponse<DashboardBlock>>)> {
    validate_content(&input.block_type, &input.content)?;
    let block = DashboardBlockRepo::create(&state.pool, admin.tenant_id(), &input).await?;
    tracing::info!(
        block_id = block.id,
        block_type = %block.block_type,
        tenant_id = block.tenant_id,
        "Dashboard block created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: block })))
}

/// PUT /api/lms/admin/dashboard-blocks/{id}
///
/// New content is validated against the block's existing type.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDashboardBlock>,
) -> AppResult<Json<DataResponse<DashboardBlock>>> {
    let existing = DashboardBlockRepo::find_in_tenant(&state.pool, admin.tenant_id(), id)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    if let Some(content) = &input.content {
        validate_content(&existing.block_type, content)?;
    }

    let block = DashboardBlockRepo::update(&state.pool, admin.tenant_id(), id, &input)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    Ok(Json(DataResponse { data: block }))
}

/// DELETE /api/lms/admin/dashboard-blocks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if DashboardBlockRepo::delete(&state.pool, admin.tenant_id(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(block_not_found(id))
    }
}

/// PUT /api/lms/admin/dashboard-blocks/order
///
/// `ids` must list every block of the tenant exactly once.
pub async fn reorder(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<DataResponse<Vec<DashboardBlock>>>> {
    let existing = DashboardBlockRepo::ids_for_tenant(&state.pool, admin.tenant_id()).await?;
    validate_reorder(&existing, &input.ids)?;

    DashboardBlockRepo::reorder(&state.pool, admin.tenant_id(), &input.ids).await?;
    let blocks = DashboardBlockRepo::list_all(&state.pool, admin.tenant_id()).await?;
    Ok(Json(DataResponse { data: blocks }))
}
