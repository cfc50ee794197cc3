//! Well-known role names and the role hierarchy.
//!
//! These must match the seed data in `20260301000002_create_roles_table.sql`.
//! Authorization is a level comparison: a caller satisfies a requirement
//! when its role level is greater than or equal to the required level.

use crate::error::CoreError;

pub const ROLE_MEMBER: &str = "member";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// All known roles, lowest level first.
pub const ALL_ROLES: &[&str] = &[ROLE_MEMBER, ROLE_INSTRUCTOR, ROLE_ADMIN, ROLE_SUPER_ADMIN];

/// Numeric level of a role. Unknown role names get level 0 and therefore
/// satisfy no requirement.
pub fn level(role: &str) -> u8 {
    match role {
        ROLE_MEMBER => 1,
        ROLE_INSTRUCTOR => 2,
        ROLE_ADMIN => 3,
        ROLE_SUPER_ADMIN => 4,
        _ => 0,
    }
}

/// Returns `true` when `role` is at or above `required` in the hierarchy.
pub fn has_at_least(role: &str, required: &str) -> bool {
    let required_level = level(required);
    required_level > 0 && level(role) >= required_level
}

/// Whether the role is a platform operator (not bound to a single tenant).
pub fn is_platform_role(role: &str) -> bool {
    role == ROLE_SUPER_ADMIN
}

/// Validate that `actor_role` may grant `target_role` to another user.
///
/// An actor may only assign roles at or below its own level, and only a
/// super admin may mint another super admin.
pub fn validate_assignment(actor_role: &str, target_role: &str) -> Result<(), CoreError> {
    if level(target_role) == 0 {
        return Err(CoreError::Validation(format!(
            "Unknown role '{target_role}'. Must be one of: {ALL_ROLES:?}"
        )));
    }
    if target_role == ROLE_SUPER_ADMIN && actor_role != ROLE_SUPER_ADMIN {
        return Err(CoreError::Forbidden(
            "Only a super admin may assign the super_admin role".into(),
        ));
    }
    if level(target_role) > level(actor_role) {
        return Err(CoreError::Forbidden(format!(
            "Role '{actor_role}' cannot assign higher role '{target_role}'"
        )));
    }
    Ok(())
}
