use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::db::now_timestamp;
use crate::entities::{assignments, prelude::*};

pub struct AssignmentRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AssignmentRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<assignments::Model>> {
        Assignments::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query assignment by ID")
    }

    pub async fn get_for_pair(
        &self,
        ticket_id: i32,
        user_id: i32,
    ) -> Result<Option<assignments::Model>> {
        Assignments::find()
            .filter(assignments::Column::TicketId.eq(ticket_id))
            .filter(assignments::Column::UserId.eq(user_id))
            .one(self.conn)
            .await
            .context("Failed to query assignment by ticket and user")
    }

    /// Creates the (ticket, user) assignment unless it already exists and
    /// returns the stored row either way.
    pub async fn create_if_not_exists(
        &self,
        ticket_id: i32,
        user_id: i32,
        assigned_by: i32,
    ) -> Result<assignments::Model> {
        let active = assignments::ActiveModel {
            ticket_id: Set(ticket_id),
            user_id: Set(user_id),
            assigned_by: Set(Some(assigned_by)),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        Assignments::insert(active)
            .on_conflict(
                OnConflict::columns([
                    assignments::Column::TicketId,
                    assignments::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to insert assignment")?;

        self.get_for_pair(ticket_id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Assignment missing after insert"))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(self.conn)
            .await
            .context("Failed to delete assignment")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_for_pair(&self, ticket_id: i32, user_id: i32) -> Result<bool> {
        let result = Assignments::delete_many()
            .filter(assignments::Column::TicketId.eq(ticket_id))
            .filter(assignments::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await
            .context("Failed to delete assignment")?;

        Ok(result.rows_affected > 0)
    }
}
