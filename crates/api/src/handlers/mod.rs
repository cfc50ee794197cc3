//! Request handlers.
//!
//! Each submodule serves one resource. Handlers resolve the tenant through
//! the extractors in [`crate::middleware`], delegate to the matching
//! repository in `lms_db`, and map errors via [`AppError`](crate::error::AppError).

pub mod admin_users;
pub mod auth;
pub mod billing;
pub mod comments;
pub mod dashboard;
pub mod notifications;
pub mod products;
pub mod profile;
pub mod programs;
pub mod progress;
pub mod tenant;
pub mod videos;
