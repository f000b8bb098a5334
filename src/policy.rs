//! Authorization decisions.
//!
//! Pure functions over the acting user and the target; no storage access.
//! Services call these before any write and fail with
//! [`ServiceError::PermissionDenied`](crate::services::ServiceError) on `false`.

use crate::domain::{Role, UserInfo};

#[must_use]
pub const fn can_manage_users(actor: &UserInfo) -> bool {
    actor.role.is_admin()
}

/// Admins may mutate anything; everyone else only what they own.
#[must_use]
pub const fn can_mutate(actor: &UserInfo, owner_id: i32) -> bool {
    actor.role.is_admin() || actor.id == owner_id
}

#[must_use]
pub const fn can_change_role(actor: &UserInfo) -> bool {
    actor.role.is_admin()
}

/// Last-admin invariant: demoting the only remaining admin is refused.
#[must_use]
pub const fn can_demote(current: Role, new_role: Role, admin_count: u64) -> bool {
    !matches!((current, new_role), (Role::Admin, Role::Member) if admin_count <= 1)
}

#[must_use]
pub const fn can_delete_user(actor: &UserInfo, target_id: i32) -> bool {
    actor.role.is_admin() && actor.id != target_id
}

/// Non-role profile fields: self or admin.
#[must_use]
pub const fn can_edit_user(actor: &UserInfo, target_id: i32) -> bool {
    actor.role.is_admin() || actor.id == target_id
}
