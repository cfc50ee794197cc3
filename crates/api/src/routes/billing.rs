//! Route definitions for products, subscriptions and the payment processor.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{billing, products};
use crate::state::AppState;

/// Billing routes merged into `/api/lms`.
///
/// ```text
/// GET /products               -> products::list
/// GET /billing/subscription   -> billing::subscription
/// ```
pub fn lms_router() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/billing/subscription", get(billing::subscription))
}

/// Routes mounted at `/api/stripe`.
///
/// ```text
/// POST /create-tenant-checkout-session -> create_checkout_session
/// POST /create-portal-session          -> create_portal_session
/// POST /webhook                        -> webhook (signature verified)
/// ```
pub fn stripe_router() -> Router<AppState> {
    Router::new()
        .route(
            "/create-tenant-checkout-session",
            post(billing::create_checkout_session),
        )
        .route("/create-portal-session", post(billing::create_portal_session))
        .route("/webhook", post(billing::webhook))
}
