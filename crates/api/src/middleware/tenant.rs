//! Tenant resolution extractor.

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, HOST};
use axum::http::request::Parts;
use lms_core::tenancy::{cookie_value, resolution_candidates, TenantLookup, TENANT_COOKIE};
use lms_db::models::tenant::Tenant;
use lms_db::repositories::TenantRepo;
use sqlx::PgPool;

use crate::error::AppError;
use crate::state::AppState;

/// The active tenant serving this request.
///
/// Resolved once per request and cached in the request extensions, so
/// handlers and other extractors can all ask for it.
///
/// ```ignore
/// async fn handler(CurrentTenant(tenant): CurrentTenant) -> AppResult<Json<()>> {
///     tracing::info!(tenant_id = tenant.id, "scoped request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Tenant);

impl FromRequestParts<AppState> for CurrentTenant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<CurrentTenant>() {
            return Ok(cached.clone());
        }

        let candidates = {
            let host = parts
                .headers
                .get("x-forwarded-host")
                .or_else(|| parts.headers.get(HOST))
                .and_then(|v| v.to_str().ok())
                .or_else(|| parts.uri.host());

            let cookie_slug = parts
                .headers
                .get_all(COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(|header| cookie_value(header, TENANT_COOKIE));

            resolution_candidates(
                host,
                cookie_slug,
                state.config.tenancy.base_domain.as_deref(),
                state.config.tenancy.default_slug.as_deref(),
            )
        };

        let tenant = resolve_tenant(&state.pool, &candidates)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;

        tracing::debug!(tenant_id = tenant.id, slug = %tenant.slug, "Resolved tenant");

        let current = CurrentTenant(tenant);
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Try each lookup in order and return the first active tenant found.
pub async fn resolve_tenant(
    pool: &PgPool,
    candidates: &[TenantLookup],
) -> Result<Option<Tenant>, sqlx::Error> {
    for candidate in candidates {
        let found = match candidate {
            TenantLookup::Domain(domain) => TenantRepo::find_active_by_domain(pool, domain).await?,
            TenantLookup::Slug(slug) => TenantRepo::find_active_by_slug(pool, slug).await?,
        };
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}
