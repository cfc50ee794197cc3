//! Tenant and tenant branding models.

use lms_core::branding::BrandingOverrides;
use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tenants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tenant {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub domain: Option<String>,
    /// Connected payment account; never exposed to clients.
    #[serde(skip_serializing)]
    pub stripe_account_id: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tenant.
#[derive(Debug, Deserialize)]
pub struct CreateTenant {
    pub slug: String,
    pub name: String,
    pub domain: Option<String>,
    pub stripe_account_id: Option<String>,
}

/// A row from the `tenant_branding` table (overrides only).
#[derive(Debug, Clone, FromRow)]
pub struct TenantBranding {
    pub id: DbId,
    pub tenant_id: DbId,
    pub site_title: Option<String>,
    pub tagline: Option<String>,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
    pub support_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TenantBranding {
    /// The stored overrides, ready to merge over platform defaults.
    pub fn overrides(&self) -> BrandingOverrides {
        BrandingOverrides {
            site_title: self.site_title.clone(),
            tagline: self.tagline.clone(),
            logo_url: self.logo_url.clone(),
            favicon_url: self.favicon_url.clone(),
            primary_color: self.primary_color.clone(),
            secondary_color: self.secondary_color.clone(),
            accent_color: self.accent_color.clone(),
            background_color: self.background_color.clone(),
            text_color: self.text_color.clone(),
            font_family: self.font_family.clone(),
            support_email: self.support_email.clone(),
        }
    }
}
