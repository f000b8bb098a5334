//! `SeaORM` implementation of the `TicketService` trait.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use tracing::{debug, info};

use crate::db::{
    self, AssignmentRepository, CommentRepository, LabelRepository, Store, TicketRepository,
    UserRepository,
};
use crate::domain::{
    Assignment, Label, NewTicket, SetDiff, Ticket, TicketPatch, TicketStatus, UserInfo,
};
use crate::entities::tickets;
use crate::policy;
use crate::query::{self, TagPredicate};
use crate::services::error::{Resource, ServiceError, log_failure};
use crate::services::ticket_service::TicketService;

pub struct SeaOrmTicketService {
    store: Store,
}

impl SeaOrmTicketService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn create_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        ticket: NewTicket,
    ) -> Result<Ticket, ServiceError> {
        let created = TicketRepository::new(txn)
            .create(&ticket.title, actor.id)
            .await?;

        CommentRepository::new(txn)
            .create(created.id, actor.id, &ticket.description, None)
            .await?;

        let assignees: BTreeSet<i32> = ticket.assignees.into_iter().collect();
        let assignees: Vec<i32> = assignees.into_iter().collect();

        Self::add_labels(txn, created.id, &normalize_labels(&ticket.labels), actor.id).await?;
        Self::add_assignees(txn, created.id, &assignees, actor.id).await?;

        load_ticket(txn, created.id).await
    }

    async fn patch_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        id: i32,
        patch: TicketPatch,
    ) -> Result<Ticket, ServiceError> {
        let tickets = TicketRepository::new(txn);

        let mut ticket = tickets
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Ticket))?;

        if !policy::can_mutate(actor, ticket.created_by) {
            return Err(ServiceError::permission_denied(
                "only the ticket owner or an admin can edit this ticket",
            ));
        }

        let mut title_updated = false;
        if let Some(title) = patch.title
            && title != ticket.title
        {
            ticket = tickets.update_title(ticket, &title).await?;
            title_updated = true;
        }

        let mut associations_changed = false;

        if let Some(labels) = patch.labels {
            let current = tickets
                .label_names(&[id])
                .await?
                .remove(&id)
                .unwrap_or_default();
            let diff = SetDiff::between(&current, &normalize_labels(&labels));

            if !diff.is_empty() {
                debug!(
                    ticket_id = id,
                    added = diff.to_add.len(),
                    removed = diff.to_remove.len(),
                    "Reconciling ticket labels"
                );
                Self::remove_labels(txn, id, &diff.to_remove).await?;
                Self::add_labels(txn, id, &diff.to_add, actor.id).await?;
                associations_changed = true;
            }
        }

        if let Some(assignees) = patch.assignees {
            let current = tickets
                .assignee_ids(&[id])
                .await?
                .remove(&id)
                .unwrap_or_default();
            let diff = SetDiff::between(&current, &assignees);

            if !diff.is_empty() {
                debug!(
                    ticket_id = id,
                    added = diff.to_add.len(),
                    removed = diff.to_remove.len(),
                    "Reconciling ticket assignees"
                );
                Self::remove_assignees(txn, id, &diff.to_remove).await?;
                Self::add_assignees(txn, id, &diff.to_add, actor.id).await?;
                associations_changed = true;
            }
        }

        if associations_changed && !title_updated {
            tickets.touch(ticket).await?;
        }

        load_ticket(txn, id).await
    }

    async fn add_labels(
        txn: &DatabaseTransaction,
        ticket_id: i32,
        names: &[String],
        actor_id: i32,
    ) -> Result<(), ServiceError> {
        let labels = LabelRepository::new(txn);

        for name in names {
            let label = labels.get_or_create(name, actor_id).await?;
            labels.assign_to_ticket(ticket_id, label.id).await?;
        }

        Ok(())
    }

    async fn remove_labels(
        txn: &DatabaseTransaction,
        ticket_id: i32,
        names: &[String],
    ) -> Result<(), ServiceError> {
        let labels = LabelRepository::new(txn);

        for name in names {
            if let Some(label) = labels.get_by_name(name).await? {
                labels.unassign_from_ticket(ticket_id, label.id).await?;
            }
        }

        Ok(())
    }

    async fn add_assignees(
        txn: &DatabaseTransaction,
        ticket_id: i32,
        user_ids: &[i32],
        actor_id: i32,
    ) -> Result<(), ServiceError> {
        let users = UserRepository::new(txn);
        let assignments = AssignmentRepository::new(txn);

        for &user_id in user_ids {
            if users.get_by_id(user_id).await?.is_none() {
                return Err(ServiceError::NotFound(Resource::User));
            }
            assignments
                .create_if_not_exists(ticket_id, user_id, actor_id)
                .await?;
        }

        Ok(())
    }

    async fn remove_assignees(
        txn: &DatabaseTransaction,
        ticket_id: i32,
        user_ids: &[i32],
    ) -> Result<(), ServiceError> {
        let assignments = AssignmentRepository::new(txn);

        for &user_id in user_ids {
            assignments.delete_for_pair(ticket_id, user_id).await?;
        }

        Ok(())
    }

    async fn set_status_in_txn(
        txn: &DatabaseTransaction,
        id: i32,
        status: TicketStatus,
    ) -> Result<Ticket, ServiceError> {
        let tickets = TicketRepository::new(txn);

        let ticket = tickets
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Ticket))?;

        if ticket.status != status {
            tickets.update_status(ticket, status).await?;
        }

        load_ticket(txn, id).await
    }

    async fn delete_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        id: i32,
    ) -> Result<(), ServiceError> {
        let tickets = TicketRepository::new(txn);

        let ticket = tickets
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Ticket))?;

        if !policy::can_mutate(actor, ticket.created_by) {
            return Err(ServiceError::permission_denied(
                "only the ticket owner or an admin can delete this ticket",
            ));
        }

        tickets.delete(id).await?;
        Ok(())
    }

    async fn assign_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        ticket_id: i32,
        user_id: i32,
    ) -> Result<Assignment, ServiceError> {
        let ticket = TicketRepository::new(txn)
            .get(ticket_id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Ticket))?;

        if !policy::can_mutate(actor, ticket.created_by) {
            return Err(ServiceError::permission_denied(
                "only the ticket owner or an admin can assign users",
            ));
        }

        if UserRepository::new(txn).get_by_id(user_id).await?.is_none() {
            return Err(ServiceError::NotFound(Resource::User));
        }

        let assignment = AssignmentRepository::new(txn)
            .create_if_not_exists(ticket_id, user_id, actor.id)
            .await?;

        Ok(assignment.into())
    }

    async fn unassign_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        assignment_id: i32,
    ) -> Result<(), ServiceError> {
        let assignments = AssignmentRepository::new(txn);

        let assignment = assignments
            .get(assignment_id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Assignment))?;

        let ticket = TicketRepository::new(txn)
            .get(assignment.ticket_id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Ticket))?;

        if !policy::can_mutate(actor, ticket.created_by) {
            return Err(ServiceError::permission_denied(
                "only the ticket owner or an admin can unassign users",
            ));
        }

        assignments.delete(assignment_id).await?;
        Ok(())
    }
}

#[async_trait]
impl TicketService for SeaOrmTicketService {
    async fn create_ticket(
        &self,
        actor: &UserInfo,
        ticket: NewTicket,
    ) -> Result<Ticket, ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::create_in_txn(&txn, actor, ticket).await;
        let ticket = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("create_ticket", e))?;

        info!(ticket_id = ticket.id, actor = actor.id, "Ticket created");
        Ok(ticket)
    }

    async fn get_ticket(&self, id: i32) -> Result<Ticket, ServiceError> {
        load_ticket(&self.store.conn, id).await
    }

    async fn list_tickets(&self, predicates: &[TagPredicate]) -> Result<Vec<Ticket>, ServiceError> {
        let models = self
            .store
            .tickets()
            .list(predicates)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("list_tickets", e))?;

        hydrate(&self.store.conn, models).await
    }

    async fn search_tickets(&self, query: &str) -> Result<Vec<Ticket>, ServiceError> {
        let predicates = query::parse(query)?;
        self.list_tickets(&predicates).await
    }

    async fn patch_ticket(
        &self,
        actor: &UserInfo,
        id: i32,
        patch: TicketPatch,
    ) -> Result<Ticket, ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::patch_in_txn(&txn, actor, id, patch).await;
        let ticket = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("patch_ticket", e))?;

        info!(ticket_id = id, actor = actor.id, "Ticket updated");
        Ok(ticket)
    }

    async fn patch_ticket_status(
        &self,
        actor: &UserInfo,
        id: i32,
        status: TicketStatus,
    ) -> Result<Ticket, ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::set_status_in_txn(&txn, id, status).await;
        let ticket = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("patch_ticket_status", e))?;

        info!(ticket_id = id, actor = actor.id, %status, "Ticket status changed");
        Ok(ticket)
    }

    async fn delete_ticket(&self, actor: &UserInfo, id: i32) -> Result<(), ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::delete_in_txn(&txn, actor, id).await;
        db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("delete_ticket", e))?;

        info!(ticket_id = id, actor = actor.id, "Ticket deleted");
        Ok(())
    }

    async fn list_labels(&self) -> Result<Vec<Label>, ServiceError> {
        let labels = self.store.labels().list().await?;
        Ok(labels.into_iter().map(Label::from).collect())
    }

    async fn create_label(&self, actor: &UserInfo, name: &str) -> Result<Label, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::EmptyLabelName);
        }

        let label = self
            .store
            .labels()
            .get_or_create(name, actor.id)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("create_label", e))?;

        Ok(label.into())
    }

    async fn create_assignment(
        &self,
        actor: &UserInfo,
        ticket_id: i32,
        user_id: i32,
    ) -> Result<Assignment, ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::assign_in_txn(&txn, actor, ticket_id, user_id).await;
        let assignment = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("create_assignment", e))?;

        info!(ticket_id, user_id, actor = actor.id, "User assigned to ticket");
        Ok(assignment)
    }

    async fn delete_assignment(
        &self,
        actor: &UserInfo,
        assignment_id: i32,
    ) -> Result<(), ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::unassign_in_txn(&txn, actor, assignment_id).await;
        db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("delete_assignment", e))?;

        info!(assignment_id, actor = actor.id, "Assignment removed");
        Ok(())
    }
}

/// Trimmed, non-empty, deduplicated label names.
fn normalize_labels(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn load_ticket<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Ticket, ServiceError> {
    let model = TicketRepository::new(conn)
        .get(id)
        .await?
        .ok_or(ServiceError::NotFound(Resource::Ticket))?;

    hydrate(conn, vec![model])
        .await?
        .pop()
        .ok_or(ServiceError::NotFound(Resource::Ticket))
}

async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    models: Vec<tickets::Model>,
) -> Result<Vec<Ticket>, ServiceError> {
    let repo = TicketRepository::new(conn);
    let ids: Vec<i32> = models.iter().map(|t| t.id).collect();

    let mut labels = repo.label_names(&ids).await?;
    let mut assignees = repo.assignee_ids(&ids).await?;

    Ok(models
        .into_iter()
        .map(|model| {
            let id = model.id;
            Ticket::hydrate(
                model,
                labels.remove(&id).unwrap_or_default(),
                assignees.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_labels() {
        let raw = vec![
            " bug ".to_string(),
            "site".to_string(),
            String::new(),
            "bug".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_labels(&raw), vec!["bug", "site"]);
    }
}
