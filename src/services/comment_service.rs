//! Domain service for ticket comments.

use crate::domain::{Comment, UserInfo};
use crate::services::error::ServiceError;

/// Domain service trait for comments.
#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    /// Adds a comment. Anyone authenticated may comment on any ticket.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the ticket is missing or if
    /// `reply_to` is not a comment on the same ticket.
    async fn create_comment(
        &self,
        actor: &UserInfo,
        ticket_id: i32,
        content: &str,
        reply_to: Option<i32>,
    ) -> Result<Comment, ServiceError>;

    async fn patch_comment(
        &self,
        actor: &UserInfo,
        id: i32,
        content: &str,
    ) -> Result<Comment, ServiceError>;

    /// Deletes a comment. A ticket's first comment holds its description and
    /// cannot be deleted on its own.
    async fn delete_comment(&self, actor: &UserInfo, id: i32) -> Result<(), ServiceError>;

    /// Comments of a ticket, oldest first.
    async fn list_comments(&self, ticket_id: i32) -> Result<Vec<Comment>, ServiceError>;
}
