//! Route definitions for tenant administration.

use axum::routing::{get, post, put};
use axum::Router;

use super::dashboard;
use crate::handlers::{admin_users, products, programs, tenant, videos};
use crate::state::AppState;

/// Routes mounted at `/api/lms/admin`.
///
/// ```text
/// PUT    /branding                 -> tenant::update_branding       (admin+)
///
/// GET    /videos                   -> videos::admin_list            (instructor+)
/// POST   /videos                   -> videos::create
/// PUT    /videos/{id}              -> videos::update
/// DELETE /videos/{id}              -> videos::delete
///
/// GET    /programs                 -> programs::admin_list          (instructor+)
/// POST   /programs                 -> programs::create
/// PUT    /programs/{id}            -> programs::update
/// DELETE /programs/{id}            -> programs::delete
/// PUT    /programs/{id}/lessons    -> programs::replace_lessons
///
/// GET    /products                 -> products::admin_list          (admin+)
/// POST   /products                 -> products::create
/// PUT    /products/{id}            -> products::update
/// DELETE /products/{id}            -> products::delete
///
/// /dashboard-blocks/...            -> see dashboard::admin_router   (admin+)
///
/// GET    /users                    -> admin_users::list             (admin+)
/// PUT    /users/{id}/role          -> admin_users::assign_role
/// POST   /users/{id}/deactivate    -> admin_users::deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/branding", put(tenant::update_branding))
        .route("/videos", get(videos::admin_list).post(videos::create))
        .route("/videos/{id}", put(videos::update).delete(videos::delete))
        .route("/programs", get(programs::admin_list).post(programs::create))
        .route(
            "/programs/{id}",
            put(programs::update).delete(programs::delete),
        )
        .route("/programs/{id}/lessons", put(programs::replace_lessons))
        .route("/products", get(products::admin_list).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::delete),
        )
        .nest("/dashboard-blocks", dashboard::admin_router())
        .route("/users", get(admin_users::list))
        .route("/users/{id}/role", put(admin_users::assign_role))
        .route("/users/{id}/deactivate", post(admin_users::deactivate))
}
