//! Role-based access control (RBAC) extractors.
//!
//! Every extractor here binds the caller to the current tenant first, then
//! applies a role floor from the `member < instructor < admin < super_admin`
//! hierarchy.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use lms_core::error::CoreError;
use lms_core::roles::{self, ROLE_ADMIN, ROLE_INSTRUCTOR};
use lms_core::types::DbId;
use lms_db::models::tenant::Tenant;

use super::auth::AuthUser;
use super::tenant::CurrentTenant;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated user acting inside the current tenant.
///
/// Rejects with 403 when the token was issued for another tenant. Platform
/// super admins pass for every tenant.
///
/// Use `Option<TenantUser>` on public routes that personalize their output
/// for signed-in callers; a missing `Authorization` header yields `None`.
#[derive(Debug, Clone)]
pub struct TenantUser {
    pub user_id: DbId,
    pub role: String,
    pub tenant: Tenant,
}

impl TenantUser {
    /// Whether the caller's role is at or above `required`.
    pub fn is_at_least(&self, required: &str) -> bool {
        roles::has_at_least(&self.role, required)
    }

    pub fn tenant_id(&self) -> DbId {
        self.tenant.id
    }
}

impl FromRequestParts<AppState> for TenantUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let CurrentTenant(tenant) = CurrentTenant::from_request_parts(parts, state).await?;

        if !roles::is_platform_role(&user.role) && user.tenant_id != Some(tenant.id) {
            tracing::warn!(
                user_id = user.user_id,
                token_tenant = ?user.tenant_id,
                tenant_id = tenant.id,
                "Token used against a different tenant"
            );
            return Err(AppError::Core(CoreError::Forbidden(
                "Token was not issued for this tenant".into(),
            )));
        }

        Ok(TenantUser {
            user_id: user.user_id,
            role: user.role,
            tenant,
        })
    }
}

impl OptionalFromRequestParts<AppState> for TenantUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        <TenantUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

/// Requires `instructor` or higher in the current tenant.
///
/// ```ignore
/// async fn stats(RequireInstructor(user): RequireInstructor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireInstructor(pub TenantUser);

impl FromRequestParts<AppState> for RequireInstructor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = <TenantUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await?;
        if !user.is_at_least(ROLE_INSTRUCTOR) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Instructor role required".into(),
            )));
        }
        Ok(RequireInstructor(user))
    }
}

/// Requires `admin` or higher in the current tenant.
pub struct RequireAdmin(pub TenantUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = <TenantUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await?;
        if !user.is_at_least(ROLE_ADMIN) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
