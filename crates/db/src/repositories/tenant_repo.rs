//! Repository for the `tenants` and `tenant_branding` tables.

use lms_core::branding::BrandingOverrides;
use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::tenant::{CreateTenant, Tenant, TenantBranding};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slug, name, domain, stripe_account_id, is_active, created_at, updated_at";

const BRANDING_COLUMNS: &str = "id, tenant_id, site_title, tagline, logo_url, favicon_url, \
                                 primary_color, secondary_color, accent_color, background_color, \
                                 text_color, font_family, support_email, created_at, updated_at";

/// Provides lookup and branding operations for tenants.
pub struct TenantRepo;

impl TenantRepo {
    /// Insert a new tenant, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTenant) -> Result<Tenant, sqlx::Error> {
        let query = format!(
            "INSERT INTO tenants (slug, name, domain, stripe_account_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.domain)
            .bind(&input.stripe_account_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE id = $1");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active tenant by its custom domain (already normalized).
    pub async fn find_active_by_domain(
        pool: &PgPool,
        domain: &str,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tenants WHERE domain = $1 AND is_active = true");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(domain)
            .fetch_optional(pool)
            .await
    }

    /// Find an active tenant by slug.
    pub async fn find_active_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenants WHERE slug = $1 AND is_active = true");
        sqlx::query_as::<_, Tenant>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a tenant. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE tenants SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch the branding overrides document for a tenant, if one exists.
    pub async fn get_branding(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Option<TenantBranding>, sqlx::Error> {
        let query = format!("SELECT {BRANDING_COLUMNS} FROM tenant_branding WHERE tenant_id = $1");
        sqlx::query_as::<_, TenantBranding>(&query)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or patch the branding document. `None` fields keep their
    /// stored value.
    pub async fn upsert_branding(
        pool: &PgPool,
        tenant_id: DbId,
        input: &BrandingOverrides,
    ) -> Result<TenantBranding, sqlx::Error> {
        let query = format!(
            "INSERT INTO tenant_branding (tenant_id, site_title, tagline, logo_url, favicon_url,
                 primary_color, secondary_color, accent_color, background_color, text_color,
                 font_family, support_email)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (tenant_id) DO UPDATE SET
                 site_title = COALESCE(EXCLUDED.site_title, tenant_branding.site_title),
                 tagline = COALESCE(EXCLUDED.tagline, tenant_branding.tagline),
                 logo_url = COALESCE(EXCLUDED.logo_url, tenant_branding.logo_url),
                 favicon_url = COALESCE(EXCLUDED.favicon_url, tenant_branding.favicon_url),
                 primary_color = COALESCE(EXCLUDED.primary_color, tenant_branding.primary_color),
                 secondary_color = COALESCE(EXCLUDED.secondary_color, tenant_branding.secondary_color),
                 accent_color = COALESCE(EXCLUDED.accent_color, tenant_branding.accent_color),
                 background_color = COALESCE(EXCLUDED.background_color, tenant_branding.background_color),
                 text_color = COALESCE(EXCLUDED.text_color, tenant_branding.text_color),
                 font_family = COALESCE(EXCLUDED.font_family, tenant_branding.font_family),
                 support_email = COALESCE(EXCLUDED.support_email, tenant_branding.support_email)
             RETURNING {BRANDING_COLUMNS}"
        );
        sqlx::query_as::<_, TenantBranding>(&query)
            .bind(tenant_id)
            .bind(&input.site_title)
            .bind(&input.tagline)
            .bind(&input.logo_url)
            .bind(&input.favicon_url)
            .bind(&input.primary_color)
            .bind(&input.secondary_color)
            .bind(&input.accent_color)
            .bind(&input.background_color)
            .bind(&input.text_color)
            .bind(&input.font_family)
            .bind(&input.support_email)
            .fetch_one(pool)
            .await
    }
}
