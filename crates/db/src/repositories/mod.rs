//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod dashboard_block_repo;
pub mod notification_repo;
pub mod product_repo;
pub mod program_repo;
pub mod progress_repo;
pub mod role_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod tenant_repo;
pub mod user_repo;
pub mod video_repo;

pub use comment_repo::CommentRepo;
pub use dashboard_block_repo::DashboardBlockRepo;
pub use notification_repo::NotificationRepo;
pub use product_repo::ProductRepo;
pub use program_repo::ProgramRepo;
pub use progress_repo::ProgressRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use tenant_repo::TenantRepo;
pub use user_repo::UserRepo;
pub use video_repo::VideoRepo;
