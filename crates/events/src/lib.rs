//! In-process domain events for the LMS.
//!
//! - [`EventBus`] is the publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] is the event envelope. Every event is stamped with
//!   the tenant it happened in so subscribers never cross tenants.
//! - [`event_types`] lists the event names handlers publish.

pub mod bus;

pub use bus::{event_types, EventBus, PlatformEvent};
