//! Route definitions for the caller's own account.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/api/lms/me`.
///
/// ```text
/// GET  /          -> me
/// PUT  /          -> update
/// PUT  /password  -> change_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::me).put(profile::update))
        .route("/password", put(profile::change_password))
}
