use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::db::now_timestamp;
use crate::entities::{labels, prelude::*, ticket_labels};

pub struct LabelRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LabelRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<labels::Model>> {
        Labels::find()
            .filter(labels::Column::Name.eq(name))
            .one(self.conn)
            .await
            .context("Failed to query label by name")
    }

    pub async fn list(&self) -> Result<Vec<labels::Model>> {
        Labels::find()
            .order_by_asc(labels::Column::Name)
            .all(self.conn)
            .await
            .context("Failed to list labels")
    }

    /// Inserts the label unless a row with this name already exists.
    /// Returns whether a new row was written.
    pub async fn create_if_not_exists(&self, name: &str, created_by: i32) -> Result<bool> {
        let active = labels::ActiveModel {
            name: Set(name.to_string()),
            created_by: Set(Some(created_by)),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        let inserted = Labels::insert(active)
            .on_conflict(
                OnConflict::column(labels::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to insert label")?;

        Ok(inserted > 0)
    }

    /// Get-or-create by name. A row inserted concurrently by another
    /// transaction is picked up by the fetch after the conflict-ignoring insert.
    pub async fn get_or_create(&self, name: &str, created_by: i32) -> Result<labels::Model> {
        if let Some(label) = self.get_by_name(name).await? {
            return Ok(label);
        }

        if self.create_if_not_exists(name, created_by).await? {
            tracing::debug!(label = name, "Created label");
        }

        self.get_by_name(name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Label '{name}' missing after insert"))
    }

    /// Idempotent; an existing link is left alone.
    pub async fn assign_to_ticket(&self, ticket_id: i32, label_id: i32) -> Result<()> {
        let active = ticket_labels::ActiveModel {
            ticket_id: Set(ticket_id),
            label_id: Set(label_id),
        };

        TicketLabels::insert(active)
            .on_conflict(
                OnConflict::columns([
                    ticket_labels::Column::TicketId,
                    ticket_labels::Column::LabelId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await
            .context("Failed to assign label to ticket")?;

        Ok(())
    }

    pub async fn unassign_from_ticket(&self, ticket_id: i32, label_id: i32) -> Result<()> {
        TicketLabels::delete_many()
            .filter(ticket_labels::Column::TicketId.eq(ticket_id))
            .filter(ticket_labels::Column::LabelId.eq(label_id))
            .exec(self.conn)
            .await
            .context("Failed to unassign label from ticket")?;

        Ok(())
    }
}
