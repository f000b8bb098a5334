use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::now_timestamp;
use crate::entities::tickets::TicketStatus;
use crate::entities::{assignments, labels, prelude::*, ticket_labels, tickets};
use crate::query::{TagKey, TagPredicate};

pub struct TicketRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TicketRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, title: &str, created_by: i32) -> Result<tickets::Model> {
        let now = now_timestamp();

        let active = tickets::ActiveModel {
            title: Set(title.to_string()),
            title_search: Set(title.to_lowercase()),
            status: Set(TicketStatus::Open),
            created_by: Set(created_by),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(self.conn)
            .await
            .context("Failed to insert ticket")
    }

    pub async fn get(&self, id: i32) -> Result<Option<tickets::Model>> {
        Tickets::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query ticket by ID")
    }

    pub async fn update_title(&self, ticket: tickets::Model, title: &str) -> Result<tickets::Model> {
        let mut active: tickets::ActiveModel = ticket.into();
        active.title = Set(title.to_string());
        active.title_search = Set(title.to_lowercase());
        active.updated_at = Set(now_timestamp());

        active
            .update(self.conn)
            .await
            .context("Failed to update ticket title")
    }

    pub async fn update_status(
        &self,
        ticket: tickets::Model,
        status: TicketStatus,
    ) -> Result<tickets::Model> {
        let mut active: tickets::ActiveModel = ticket.into();
        active.status = Set(status);
        active.updated_at = Set(now_timestamp());

        active
            .update(self.conn)
            .await
            .context("Failed to update ticket status")
    }

    /// Bumps `updated_at` after association-only changes.
    pub async fn touch(&self, ticket: tickets::Model) -> Result<tickets::Model> {
        let mut active: tickets::ActiveModel = ticket.into();
        active.updated_at = Set(now_timestamp());

        active
            .update(self.conn)
            .await
            .context("Failed to touch ticket")
    }

    /// Comments, label links and assignments go with the ticket through
    /// `ON DELETE CASCADE`.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Tickets::delete_by_id(id)
            .exec(self.conn)
            .await
            .context("Failed to delete ticket")?;

        Ok(result.rows_affected > 0)
    }

    /// Filtered listing ordered by id. Predicates are AND'd; the values of a
    /// `label` predicate are OR'd, the values of a `title` predicate are AND'd.
    pub async fn list(&self, predicates: &[TagPredicate]) -> Result<Vec<tickets::Model>> {
        let mut select = Tickets::find();

        for predicate in predicates {
            match predicate.key {
                TagKey::Title => {
                    for value in &predicate.values {
                        let pattern = contains_pattern(value);
                        select = select.filter(tickets::Column::TitleSearch.like(pattern));
                    }
                }
                TagKey::Label => {
                    let labelled = Query::select()
                        .column((ticket_labels::Entity, ticket_labels::Column::TicketId))
                        .from(ticket_labels::Entity)
                        .inner_join(
                            labels::Entity,
                            Expr::col((labels::Entity, labels::Column::Id))
                                .equals((ticket_labels::Entity, ticket_labels::Column::LabelId)),
                        )
                        .and_where(
                            Expr::col((labels::Entity, labels::Column::Name))
                                .is_in(predicate.values.clone()),
                        )
                        .to_owned();

                    select = select.filter(tickets::Column::Id.in_subquery(labelled));
                }
            }
        }

        select
            .order_by_asc(tickets::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list tickets")
    }

    /// Label names per ticket, each list sorted by name.
    pub async fn label_names(&self, ticket_ids: &[i32]) -> Result<HashMap<i32, Vec<String>>> {
        let mut by_ticket: HashMap<i32, Vec<String>> = HashMap::new();
        if ticket_ids.is_empty() {
            return Ok(by_ticket);
        }

        let rows = TicketLabels::find()
            .find_also_related(Labels)
            .filter(ticket_labels::Column::TicketId.is_in(ticket_ids.iter().copied()))
            .order_by_asc(labels::Column::Name)
            .all(self.conn)
            .await
            .context("Failed to load ticket labels")?;

        for (link, label) in rows {
            if let Some(label) = label {
                by_ticket.entry(link.ticket_id).or_default().push(label.name);
            }
        }

        Ok(by_ticket)
    }

    /// Assignee user ids per ticket, each list ascending.
    pub async fn assignee_ids(&self, ticket_ids: &[i32]) -> Result<HashMap<i32, Vec<i32>>> {
        let mut by_ticket: HashMap<i32, Vec<i32>> = HashMap::new();
        if ticket_ids.is_empty() {
            return Ok(by_ticket);
        }

        let rows = Assignments::find()
            .filter(assignments::Column::TicketId.is_in(ticket_ids.iter().copied()))
            .order_by_asc(assignments::Column::UserId)
            .all(self.conn)
            .await
            .context("Failed to load ticket assignments")?;

        for row in rows {
            by_ticket.entry(row.ticket_id).or_default().push(row.user_id);
        }

        Ok(by_ticket)
    }
}

/// `%value%` pattern against `title_search`, lowercased the same way, with
/// LIKE wildcards escaped.
fn contains_pattern(value: &str) -> LikeExpr {
    let escaped = value
        .to_lowercase()
        .replace('!', "!!")
        .replace('%', "!%")
        .replace('_', "!_");

    LikeExpr::new(format!("%{escaped}%")).escape('!')
}
