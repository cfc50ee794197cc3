//! In-app notification fan-out.
//!
//! The [`NotificationRouter`] subscribes to the event bus and turns domain
//! events into rows in the `notifications` table.

pub mod router;

pub use router::{NotificationRouter, KIND_COMMENT, KIND_COMPLETION, KIND_SUBSCRIPTION};
