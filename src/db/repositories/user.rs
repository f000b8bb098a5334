use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::entities::{prelude::*, users};
use crate::entities::users::Role;

/// Row data for a user insert. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Sparse update of a user row; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(self.conn)
            .await
            .context("Failed to query user by username")
    }

    pub async fn list(&self) -> Result<Vec<users::Model>> {
        Users::find()
            .order_by_asc(users::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list users")
    }

    pub async fn count(&self) -> Result<u64> {
        Users::find()
            .count(self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn count_admins(&self) -> Result<u64> {
        Users::find()
            .filter(users::Column::Role.eq(Role::Admin))
            .count(self.conn)
            .await
            .context("Failed to count admins")
    }

    pub async fn create(&self, record: NewUserRecord) -> Result<users::Model> {
        let now = now_timestamp();

        let active = users::ActiveModel {
            name: Set(record.name),
            username: Set(record.username),
            email: Set(record.email),
            password_hash: Set(record.password_hash),
            role: Set(record.role),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(self.conn).await.context("Failed to insert user")
    }

    pub async fn update(&self, user: users::Model, changes: UserChanges) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        active.updated_at = Set(now_timestamp());

        active.update(self.conn).await.context("Failed to update user")
    }

    /// Returns `false` when no row matched.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }
}
