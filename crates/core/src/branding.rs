//! Per-tenant branding: platform defaults, validation, and merge.
//!
//! A tenant's branding document only stores overrides. The value served to
//! clients is always fully populated: each missing field falls back to the
//! platform default, and a missing site title falls back to the tenant name.

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;

pub const DEFAULT_PRIMARY_COLOR: &str = "#2563eb";
pub const DEFAULT_SECONDARY_COLOR: &str = "#1e293b";
pub const DEFAULT_ACCENT_COLOR: &str = "#f59e0b";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#0f172a";
pub const DEFAULT_FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

/// Maximum length of free-text branding fields.
pub const MAX_TEXT_LEN: usize = 200;

/// Branding overrides as stored per tenant. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandingOverrides {
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
}

/// Fully resolved branding returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBranding {
    pub site_title: String,
    pub tagline: Option<String>,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    pub support_email: Option<String>,
}

/// Merge tenant overrides over the platform defaults.
///
/// Blank strings count as unset.
pub fn resolve(tenant_name: &str, overrides: Option<&BrandingOverrides>) -> ResolvedBranding {
    let empty = BrandingOverrides::default();
    let o = overrides.unwrap_or(&empty);

    let pick = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let or_default = |value: &Option<String>, default: &str| {
        pick(value).unwrap_or_else(|| default.to_string())
    };

    ResolvedBranding {
        site_title: or_default(&o.site_title, tenant_name),
        tagline: pick(&o.tagline),
        logo_url: pick(&o.logo_url),
        favicon_url: pick(&o.favicon_url),
        primary_color: or_default(&o.primary_color, DEFAULT_PRIMARY_COLOR),
        secondary_color: or_default(&o.secondary_color, DEFAULT_SECONDARY_COLOR),
        accent_color: or_default(&o.accent_color, DEFAULT_ACCENT_COLOR),
        background_color: or_default(&o.background_color, DEFAULT_BACKGROUND_COLOR),
        text_color: or_default(&o.text_color, DEFAULT_TEXT_COLOR),
        font_family: or_default(&o.font_family, DEFAULT_FONT_FAMILY),
        support_email: pick(&o.support_email),
    }
}

/// Returns `true` for `#rgb` or `#rrggbb` hex colors.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Returns `true` for absolute `http://` or `https://` URLs with a host.
pub fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(r) if !r.is_empty() && !r.starts_with('/') && !r.contains(char::is_whitespace))
}

/// Validate a branding override document before it is stored.
pub fn validate_overrides(o: &BrandingOverrides) -> Result<(), CoreError> {
    let colors = [
        ("primary_color", &o.primary_color),
        ("secondary_color", &o.secondary_color),
        ("accent_color", &o.accent_color),
        ("background_color", &o.background_color),
        ("text_color", &o.text_color),
    ];
    for (field, value) in colors {
        if let Some(v) = value {
            if !is_hex_color(v) {
                return Err(CoreError::Validation(format!(
                    "{field} must be a hex color like #1a2b3c, got '{v}'"
                )));
            }
        }
    }

    for (field, value) in [("logo_url", &o.logo_url), ("favicon_url", &o.favicon_url)] {
        if let Some(v) = value {
            if !is_http_url(v) {
                return Err(CoreError::Validation(format!(
                    "{field} must be an http(s) URL"
                )));
            }
        }
    }

    let texts = [
        ("site_title", &o.site_title),
        ("tagline", &o.tagline),
        ("font_family", &o.font_family),
    ];
    for (field, value) in texts {
        if let Some(v) = value {
            if v.chars().count() > MAX_TEXT_LEN {
                return Err(CoreError::Validation(format!(
                    "{field} must be at most {MAX_TEXT_LEN} characters"
                )));
            }
        }
    }

    if let Some(email) = &o.support_email {
        if !email.validate_email() {
            return Err(CoreError::Validation(
                "support_email must be a valid email address".into(),
            ));
        }
    }

    Ok(())
}
