//! Domain service for tickets, their labels and their assignees.
//!
//! Every mutation runs in a single transaction. Label and assignee sets are
//! reconciled with [`SetDiff`](crate::domain::SetDiff), so re-submitting the
//! current set writes nothing.

use crate::domain::{Assignment, Label, NewTicket, Ticket, TicketPatch, TicketStatus, UserInfo};
use crate::query::TagPredicate;
use crate::services::error::ServiceError;

/// Domain service trait for tickets.
#[async_trait::async_trait]
pub trait TicketService: Send + Sync {
    /// Creates a ticket owned by `actor`. The description becomes the first
    /// comment; labels are created on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if an assignee does not exist, in
    /// which case nothing is written.
    async fn create_ticket(&self, actor: &UserInfo, ticket: NewTicket)
    -> Result<Ticket, ServiceError>;

    async fn get_ticket(&self, id: i32) -> Result<Ticket, ServiceError>;

    /// Lists tickets matching every predicate, ordered by id.
    async fn list_tickets(&self, predicates: &[TagPredicate]) -> Result<Vec<Ticket>, ServiceError>;

    /// Parses `query` and lists the matching tickets.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidSearchQuery`] for an unknown key or a
    /// malformed term.
    async fn search_tickets(&self, query: &str) -> Result<Vec<Ticket>, ServiceError>;

    /// Applies a sparse update. Only the owner or an admin may patch.
    async fn patch_ticket(
        &self,
        actor: &UserInfo,
        id: i32,
        patch: TicketPatch,
    ) -> Result<Ticket, ServiceError>;

    /// Opens or closes a ticket. Any authenticated user may do this.
    async fn patch_ticket_status(
        &self,
        actor: &UserInfo,
        id: i32,
        status: TicketStatus,
    ) -> Result<Ticket, ServiceError>;

    /// Deletes a ticket together with its comments, label links and
    /// assignments.
    async fn delete_ticket(&self, actor: &UserInfo, id: i32) -> Result<(), ServiceError>;

    /// Lists all labels by name.
    async fn list_labels(&self) -> Result<Vec<Label>, ServiceError>;

    /// Returns the label with this name, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmptyLabelName`] when the trimmed name is empty.
    async fn create_label(&self, actor: &UserInfo, name: &str) -> Result<Label, ServiceError>;

    /// Assigns `user_id` to a ticket. Assigning twice returns the existing row.
    async fn create_assignment(
        &self,
        actor: &UserInfo,
        ticket_id: i32,
        user_id: i32,
    ) -> Result<Assignment, ServiceError>;

    async fn delete_assignment(
        &self,
        actor: &UserInfo,
        assignment_id: i32,
    ) -> Result<(), ServiceError>;
}
