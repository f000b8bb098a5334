//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{self, NewUserRecord, Store, UserChanges, UserRepository};
use crate::domain::{NewUser, UserInfo, UserPatch};
use crate::policy;
use crate::services::error::{Resource, ServiceError, log_failure};
use crate::services::password::hash_password_blocking;
use crate::services::user_service::UserService;

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn create_in_txn(
        txn: &DatabaseTransaction,
        user: NewUser,
        password_hash: String,
    ) -> Result<UserInfo, ServiceError> {
        let users = UserRepository::new(txn);

        if users.get_by_email(&user.email).await?.is_some() {
            return Err(ServiceError::EmailAlreadyInUse);
        }
        if users.get_by_username(&user.username).await?.is_some() {
            return Err(ServiceError::UsernameAlreadyInUse);
        }

        let created = users
            .create(NewUserRecord {
                name: user.name,
                username: user.username,
                email: user.email,
                password_hash,
                role: user.role,
            })
            .await?;

        Ok(created.into())
    }

    async fn patch_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        target_id: i32,
        patch: UserPatch,
        password_hash: Option<String>,
    ) -> Result<UserInfo, ServiceError> {
        let users = UserRepository::new(txn);

        let target = users
            .get_by_id(target_id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::User))?;

        let email = patch.email.filter(|email| *email != target.email);
        if let Some(email) = &email
            && users.get_by_email(email).await?.is_some()
        {
            return Err(ServiceError::EmailAlreadyInUse);
        }

        let username = patch.username.filter(|username| *username != target.username);
        if let Some(username) = &username
            && users.get_by_username(username).await?.is_some()
        {
            return Err(ServiceError::UsernameAlreadyInUse);
        }

        let role = patch.role.filter(|role| *role != target.role);
        if let Some(role) = role {
            if !policy::can_change_role(actor) {
                return Err(ServiceError::permission_denied(
                    "only an admin can change roles",
                ));
            }

            let admin_count = users.count_admins().await?;
            if !policy::can_demote(target.role, role, admin_count) {
                return Err(ServiceError::LastAdminInvariantViolation);
            }
        }

        let updated = users
            .update(
                target,
                UserChanges {
                    name: patch.name,
                    username,
                    email,
                    password_hash,
                    role,
                },
            )
            .await?;

        Ok(updated.into())
    }

    async fn delete_in_txn(txn: &DatabaseTransaction, target_id: i32) -> Result<(), ServiceError> {
        if !UserRepository::new(txn).delete(target_id).await? {
            return Err(ServiceError::NotFound(Resource::User));
        }

        Ok(())
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create_user(&self, actor: &UserInfo, user: NewUser) -> Result<UserInfo, ServiceError> {
        if !policy::can_manage_users(actor) {
            return Err(ServiceError::permission_denied(
                "only an admin can create users",
            ));
        }

        let password_hash = hash_password_blocking(&user.password, &self.security).await?;

        let txn = self.store.begin().await?;
        let result = Self::create_in_txn(&txn, user, password_hash).await;
        let created = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("create_user", e))?;

        info!(user_id = created.id, role = %created.role, actor = actor.id, "User created");
        Ok(created)
    }

    async fn patch_user(
        &self,
        actor: &UserInfo,
        target_id: i32,
        patch: UserPatch,
    ) -> Result<UserInfo, ServiceError> {
        if !policy::can_edit_user(actor, target_id) {
            return Err(ServiceError::permission_denied(
                "only the user themselves or an admin can edit this user",
            ));
        }

        let password_hash = match &patch.password {
            Some(password) => Some(hash_password_blocking(password, &self.security).await?),
            None => None,
        };

        let txn = self.store.begin().await?;
        let result = Self::patch_in_txn(&txn, actor, target_id, patch, password_hash).await;
        let updated = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("patch_user", e))?;

        info!(user_id = target_id, actor = actor.id, "User updated");
        Ok(updated)
    }

    async fn delete_user(&self, actor: &UserInfo, target_id: i32) -> Result<(), ServiceError> {
        if !policy::can_delete_user(actor, target_id) {
            return Err(ServiceError::permission_denied(
                "only an admin can delete users, and not themselves",
            ));
        }

        let txn = self.store.begin().await?;
        let result = Self::delete_in_txn(&txn, target_id).await;
        db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("delete_user", e))?;

        info!(user_id = target_id, actor = actor.id, "User deleted");
        Ok(())
    }

    async fn get_user(&self, id: i32) -> Result<UserInfo, ServiceError> {
        self.store
            .users()
            .get_by_id(id)
            .await?
            .map(UserInfo::from)
            .ok_or(ServiceError::NotFound(Resource::User))
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, ServiceError> {
        let users = self.store.users().list().await?;
        Ok(users.into_iter().map(UserInfo::from).collect())
    }
}
