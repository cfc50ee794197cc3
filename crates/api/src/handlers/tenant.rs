//! Handlers for the resolved tenant and its branding.

use axum::extract::State;
use axum::Json;
use lms_core::branding::{self, BrandingOverrides, ResolvedBranding};
use lms_db::models::tenant::Tenant;
use lms_db::repositories::TenantRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::tenant::CurrentTenant;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/lms/tenant
pub async fn get_tenant(CurrentTenant(tenant): CurrentTenant) -> Json<DataResponse<Tenant>> {
    Json(DataResponse { data: tenant })
}

/// GET /api/lms/branding
///
/// Stored overrides merged over the platform defaults.
pub async fn get_branding(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
) -> AppResult<Json<DataResponse<ResolvedBranding>>> {
    let stored = TenantRepo::get_branding(&state.pool, tenant.id).await?;
    let overrides = stored.map(|b| b.overrides());
    Ok(Json(DataResponse {
        data: branding::resolve(&tenant.name, overrides.as_ref()),
    }))
}

/// PUT /api/lms/admin/branding
///
/// Partial update: omitted fields keep their stored value.
pub async fn update_branding(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<BrandingOverrides>,
) -> AppResult<Json<DataResponse<ResolvedBranding>>> {
    branding::validate_overrides(&input)?;

    let stored = TenantRepo::upsert_branding(&state.pool, admin.tenant_id(), &input).await?;
    tracing::info!(
        tenant_id = admin.tenant_id(),
        user_id = admin.user_id,
        "Branding updated"
    );

    Ok(Json(DataResponse {
        data: branding::resolve(&admin.tenant.name, Some(&stored.overrides())),
    }))
}
