use crate::auth::jwt::JwtConfig;
use crate::billing::stripe::StripeConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `JWT_SECRET`, which must always be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to stop after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Hostname to tenant mapping settings.
    pub tenancy: TenancyConfig,
    /// Public URL of the learner-facing app, used for checkout redirects.
    pub public_app_url: String,
    pub stripe: StripeConfig,
}

/// How requests are mapped to tenants.
#[derive(Debug, Clone, Default)]
pub struct TenancyConfig {
    /// Platform domain whose single-label subdomains are tenant slugs,
    /// e.g. `lms.example.com` maps `acme.lms.example.com` to `acme`.
    pub base_domain: Option<String>,
    /// Tenant used when nothing else matches. Unset means unmatched
    /// requests get `404 Tenant not found`.
    pub default_slug: Option<String>,
}

impl TenancyConfig {
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `LMS_BASE_DOMAIN`     | unset   |
    /// | `DEFAULT_TENANT_SLUG` | unset   |
    pub fn from_env() -> Self {
        Self {
            base_domain: non_empty_env("LMS_BASE_DOMAIN"),
            default_slug: non_empty_env("DEFAULT_TENANT_SLUG"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `PUBLIC_APP_URL`       | `http://localhost:5173`    |
    ///
    /// See [`JwtConfig::from_env`], [`TenancyConfig::from_env`] and
    /// [`StripeConfig::from_env`] for the nested sections.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let public_app_url = std::env::var("PUBLIC_APP_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            tenancy: TenancyConfig::from_env(),
            public_app_url,
            stripe: StripeConfig::from_env(),
        }
    }
}

/// Read an env var, treating empty values as unset.
pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
