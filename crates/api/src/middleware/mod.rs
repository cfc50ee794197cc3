//! Request extractors for tenancy, authentication and authorization.
//!
//! - [`tenant::CurrentTenant`] -- the tenant resolved from host and cookie.
//! - [`auth::AuthUser`] -- the caller decoded from a JWT Bearer token.
//! - [`rbac::TenantUser`] -- an authenticated caller bound to the current tenant.
//! - [`rbac::RequireInstructor`], [`rbac::RequireAdmin`] -- role floors.

pub mod auth;
pub mod rbac;
pub mod tenant;
