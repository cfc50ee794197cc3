use std::sync::Arc;

use crate::billing::PaymentProvider;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lms_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Event bus for domain events (comments, completions, billing).
    pub event_bus: Arc<lms_events::EventBus>,
    /// Hosted checkout / billing portal client.
    pub payments: Arc<dyn PaymentProvider>,
}
