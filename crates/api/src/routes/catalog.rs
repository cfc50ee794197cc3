//! Route definitions for videos, programs, comments and progress.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{comments, programs, progress, videos};
use crate::state::AppState;

/// Catalog routes, merged into `/api/lms`.
///
/// ```text
/// GET    /videos                  -> videos::list
/// GET    /videos/{id}             -> videos::get_by_id
/// GET    /videos/{id}/stats       -> videos::stats
/// GET    /videos/{id}/comments    -> comments::list
/// POST   /videos/{id}/comments    -> comments::create
/// POST   /videos/{id}/progress    -> progress::report
/// DELETE /comments/{id}           -> comments::delete
/// GET    /programs                -> programs::list
/// GET    /programs/{id}           -> programs::get_by_id
/// GET    /progress                -> progress::list
/// GET    /progress/summary        -> progress::summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videos", get(videos::list))
        .route("/videos/{id}", get(videos::get_by_id))
        .route("/videos/{id}/stats", get(videos::stats))
        .route(
            "/videos/{id}/comments",
            get(comments::list).post(comments::create),
        )
        .route("/videos/{id}/progress", post(progress::report))
        .route("/comments/{id}", delete(comments::delete))
        .route("/programs", get(programs::list))
        .route("/programs/{id}", get(programs::get_by_id))
        .route("/progress", get(progress::list))
        .route("/progress/summary", get(progress::summary))
}
