//! Route definitions for dashboard block administration.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/api/lms/admin/dashboard-blocks`.
///
/// ```text
/// GET    /        -> admin_list
/// POST   /        -> create
/// PUT    /order   -> reorder
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::admin_list).post(dashboard::create))
        .route("/order", put(dashboard::reorder))
        .route("/{id}", put(dashboard::update).delete(dashboard::delete))
}
