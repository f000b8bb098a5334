//! `SeaORM` implementation of the `CommentService` trait.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use tracing::info;

use crate::db::{self, CommentRepository, Store, TicketRepository};
use crate::domain::{Comment, UserInfo};
use crate::entities::comments;
use crate::policy;
use crate::services::comment_service::CommentService;
use crate::services::error::{Resource, ServiceError, log_failure};

pub struct SeaOrmCommentService {
    store: Store,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn create_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        ticket_id: i32,
        content: &str,
        reply_to: Option<i32>,
    ) -> Result<Comment, ServiceError> {
        if TicketRepository::new(txn).get(ticket_id).await?.is_none() {
            return Err(ServiceError::NotFound(Resource::Ticket));
        }

        let comments = CommentRepository::new(txn);

        if let Some(parent_id) = reply_to {
            let parent = comments.get(parent_id).await?;
            if parent.is_none_or(|parent| parent.ticket_id != ticket_id) {
                return Err(ServiceError::NotFound(Resource::Comment));
            }
        }

        let comment = comments
            .create(ticket_id, actor.id, content, reply_to)
            .await?;

        Ok(comment.into())
    }

    /// Loads the comment and checks that `actor` may change it.
    async fn owned_comment(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        id: i32,
        action: &str,
    ) -> Result<comments::Model, ServiceError> {
        let comment = CommentRepository::new(txn)
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Comment))?;

        if !policy::can_mutate(actor, comment.user_id) {
            return Err(ServiceError::permission_denied(format!(
                "only the author or an admin can {action} this comment"
            )));
        }

        Ok(comment)
    }

    async fn patch_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        id: i32,
        content: &str,
    ) -> Result<Comment, ServiceError> {
        let comment = Self::owned_comment(txn, actor, id, "edit").await?;

        let updated = CommentRepository::new(txn)
            .update_content(comment, content)
            .await?;

        Ok(updated.into())
    }

    async fn delete_in_txn(
        txn: &DatabaseTransaction,
        actor: &UserInfo,
        id: i32,
    ) -> Result<(), ServiceError> {
        let comment = Self::owned_comment(txn, actor, id, "delete").await?;
        let comments = CommentRepository::new(txn);

        let first = comments.first_for_ticket(comment.ticket_id).await?;
        if first.is_some_and(|first| first.id == comment.id) {
            return Err(ServiceError::permission_denied(
                "the ticket description cannot be deleted",
            ));
        }

        comments.delete(id).await?;
        Ok(())
    }
}

#[async_trait]
impl CommentService for SeaOrmCommentService {
    async fn create_comment(
        &self,
        actor: &UserInfo,
        ticket_id: i32,
        content: &str,
        reply_to: Option<i32>,
    ) -> Result<Comment, ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::create_in_txn(&txn, actor, ticket_id, content, reply_to).await;
        let comment = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("create_comment", e))?;

        info!(comment_id = comment.id, ticket_id, actor = actor.id, "Comment added");
        Ok(comment)
    }

    async fn patch_comment(
        &self,
        actor: &UserInfo,
        id: i32,
        content: &str,
    ) -> Result<Comment, ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::patch_in_txn(&txn, actor, id, content).await;
        let comment = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("patch_comment", e))?;

        info!(comment_id = id, actor = actor.id, "Comment edited");
        Ok(comment)
    }

    async fn delete_comment(&self, actor: &UserInfo, id: i32) -> Result<(), ServiceError> {
        let txn = self.store.begin().await?;
        let result = Self::delete_in_txn(&txn, actor, id).await;
        db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("delete_comment", e))?;

        info!(comment_id = id, actor = actor.id, "Comment deleted");
        Ok(())
    }

    async fn list_comments(&self, ticket_id: i32) -> Result<Vec<Comment>, ServiceError> {
        if self.store.tickets().get(ticket_id).await?.is_none() {
            return Err(ServiceError::NotFound(Resource::Ticket));
        }

        let comments = self.store.comments().list_for_ticket(ticket_id).await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }
}
