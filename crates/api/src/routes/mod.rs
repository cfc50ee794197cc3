pub mod account;
pub mod admin;
pub mod auth;
pub mod billing;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod notification;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/lms` route tree. Every route is scoped to the tenant
/// resolved from the request host.
///
/// Route hierarchy:
///
/// ```text
/// /tenant                                  resolved tenant (public)
/// /branding                                merged branding (public)
///
/// /videos                                  published catalog (public)
/// /videos/{id}                             single video, locked without access
/// /videos/{id}/stats                       viewing stats (instructor+)
/// /videos/{id}/comments                    list (public), create (member+)
/// /videos/{id}/progress                    report progress (member+)
/// /comments/{id}                           delete (author or instructor+)
/// /programs                                published programs (public)
/// /programs/{id}                           program with lessons and progress
///
/// /progress                                continue watching (member+)
/// /progress/summary                        totals (member+)
///
/// /products                                active products (public)
/// /billing/subscription                    caller's subscription
///
/// /dashboard                               published blocks (public)
///
/// /notifications                           feed + unread count
/// /notifications/read-all                  mark all read (POST)
/// /notifications/{id}/read                 mark read (POST)
///
/// /me                                      get, update profile
/// /me/password                             change password (PUT)
///
/// /admin/branding                          update (admin+)
/// /admin/videos[/{id}]                     CRUD (instructor+)
/// /admin/programs[/{id}]                   CRUD (instructor+)
/// /admin/programs/{id}/lessons             replace lessons (PUT)
/// /admin/products[/{id}]                   CRUD (admin+)
/// /admin/dashboard-blocks[/{id}]           CRUD (admin+)
/// /admin/dashboard-blocks/order            reorder (PUT)
/// /admin/users                             list (admin+)
/// /admin/users/{id}/role                   assign role (PUT)
/// /admin/users/{id}/deactivate             deactivate (POST)
/// ```
pub fn lms_routes() -> Router<AppState> {
    Router::new()
        .route("/tenant", get(handlers::tenant::get_tenant))
        .route("/branding", get(handlers::tenant::get_branding))
        .merge(catalog::router())
        .merge(billing::lms_router())
        .route("/dashboard", get(handlers::dashboard::list))
        .nest("/notifications", notification::router())
        .nest("/me", account::router())
        .nest("/admin", admin::router())
}

/// Routes mounted at `/api/auth`.
pub fn auth_routes() -> Router<AppState> {
    auth::router()
}

/// Routes mounted at `/api/stripe`.
pub fn stripe_routes() -> Router<AppState> {
    billing::stripe_router()
}
