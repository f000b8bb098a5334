//! Domain service for user management.
//!
//! Email and username uniqueness are checked in the same transaction as the
//! write. At least one admin exists at all times.

use crate::domain::{NewUser, UserInfo, UserPatch};
use crate::services::error::ServiceError;

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmailAlreadyInUse`] or
    /// [`ServiceError::UsernameAlreadyInUse`] when taken.
    async fn create_user(&self, actor: &UserInfo, user: NewUser) -> Result<UserInfo, ServiceError>;

    /// Applies a sparse update. Users may edit themselves; only admins may
    /// edit others or change roles.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::LastAdminInvariantViolation`] when the change
    /// would demote the only admin.
    async fn patch_user(
        &self,
        actor: &UserInfo,
        target_id: i32,
        patch: UserPatch,
    ) -> Result<UserInfo, ServiceError>;

    /// Deletes a user. Admin only, and never oneself.
    async fn delete_user(&self, actor: &UserInfo, target_id: i32) -> Result<(), ServiceError>;

    async fn get_user(&self, id: i32) -> Result<UserInfo, ServiceError>;

    async fn list_users(&self) -> Result<Vec<UserInfo>, ServiceError>;
}
