use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::entities::{comments, prelude::*};

pub struct CommentRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CommentRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        ticket_id: i32,
        user_id: i32,
        content: &str,
        reply_to: Option<i32>,
    ) -> Result<comments::Model> {
        let now = now_timestamp();

        let active = comments::ActiveModel {
            ticket_id: Set(ticket_id),
            user_id: Set(user_id),
            content: Set(content.to_string()),
            reply_to: Set(reply_to),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(self.conn)
            .await
            .context("Failed to insert comment")
    }

    pub async fn get(&self, id: i32) -> Result<Option<comments::Model>> {
        Comments::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query comment by ID")
    }

    /// The ticket's description is its oldest comment.
    pub async fn first_for_ticket(&self, ticket_id: i32) -> Result<Option<comments::Model>> {
        Comments::find()
            .filter(comments::Column::TicketId.eq(ticket_id))
            .order_by_asc(comments::Column::Id)
            .one(self.conn)
            .await
            .context("Failed to query first comment of ticket")
    }

    pub async fn list_for_ticket(&self, ticket_id: i32) -> Result<Vec<comments::Model>> {
        Comments::find()
            .filter(comments::Column::TicketId.eq(ticket_id))
            .order_by_asc(comments::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list comments")
    }

    pub async fn update_content(
        &self,
        comment: comments::Model,
        content: &str,
    ) -> Result<comments::Model> {
        let mut active: comments::ActiveModel = comment.into();
        active.content = Set(content.to_string());
        active.updated_at = Set(now_timestamp());

        active
            .update(self.conn)
            .await
            .context("Failed to update comment")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id)
            .exec(self.conn)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected > 0)
    }
}
