//! Domain types shared by the services and the (external) request layer.
//!
//! Storage rows live in [`crate::entities`]; everything here is what callers
//! see: hydrated tickets, users without password hashes, and the sparse
//! inputs for create/patch operations.

pub mod diff;

use serde::{Deserialize, Serialize};

use crate::entities::{assignments, comments, labels, tickets, users};

pub use crate::entities::tickets::TicketStatus;
pub use crate::entities::users::Role;
pub use diff::SetDiff;

/// A user as exposed to callers. The password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl UserInfo {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<users::Model> for UserInfo {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            username: model.username,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A ticket with its label names and assignee ids resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i32,
    pub title: String,
    pub status: TicketStatus,
    pub created_by: i32,
    pub created_at: String,
    pub updated_at: String,
    /// Sorted by name.
    pub labels: Vec<String>,
    /// Sorted ascending.
    pub assignees: Vec<i32>,
}

impl Ticket {
    #[must_use]
    pub fn hydrate(model: tickets::Model, labels: Vec<String>, assignees: Vec<i32>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            status: model.status,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
            labels,
            assignees,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub ticket_id: i32,
    pub content: String,
    pub created_by: i32,
    pub reply_to: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<comments::Model> for Comment {
    fn from(model: comments::Model) -> Self {
        Self {
            id: model.id,
            ticket_id: model.ticket_id,
            content: model.content,
            created_by: model.user_id,
            reply_to: model.reply_to,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i32,
    pub name: String,
    pub created_by: Option<i32>,
}

impl From<labels::Model> for Label {
    fn from(model: labels::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_by: model.created_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i32,
    pub ticket_id: i32,
    pub user_id: i32,
    pub assigned_by: Option<i32>,
}

impl From<assignments::Model> for Assignment {
    fn from(model: assignments::Model) -> Self {
        Self {
            id: model.id,
            ticket_id: model.ticket_id,
            user_id: model.user_id,
            assigned_by: model.assigned_by,
        }
    }
}

/// Input for ticket creation. The description becomes the first comment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<i32>,
}

/// Sparse ticket update. `labels` / `assignees`, when present, are the full
/// desired sets, not deltas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// First-run account; always created as admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// Raw session token. Returned exactly once; only its hash is stored.
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    /// True once the first admin has been created.
    pub setup: bool,
    pub user: Option<UserInfo>,
}
