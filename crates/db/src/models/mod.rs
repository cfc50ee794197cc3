//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod comment;
pub mod dashboard;
pub mod notification;
pub mod product;
pub mod program;
pub mod progress;
pub mod role;
pub mod session;
pub mod subscription;
pub mod tenant;
pub mod user;
pub mod video;
