//! Error taxonomy shared by every service.
//!
//! The request layer maps [`ErrorKind`] to a transport status and renders
//! [`FieldError`] for the validation-class kinds; the services only classify.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::query::QueryError;

/// What a `NotFound` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    User,
    Ticket,
    Comment,
    Label,
    Assignment,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Ticket => "ticket",
            Self::Comment => "comment",
            Self::Label => "label",
            Self::Assignment => "assignment",
        })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("session is invalid or expired")]
    SessionInvalidOrExpired,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0} not found")]
    NotFound(Resource),

    #[error("email already in use")]
    EmailAlreadyInUse,

    #[error("username already in use")]
    UsernameAlreadyInUse,

    #[error("label name is empty")]
    EmptyLabelName,

    #[error("invalid search query: {0}")]
    InvalidSearchQuery(String),

    #[error("permission denied: can't remove the last admin")]
    LastAdminInvariantViolation,

    #[error("setup is already done")]
    SetupAlreadyDone,

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

/// Stable tag for each error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidCredentials,
    SessionInvalidOrExpired,
    PermissionDenied,
    LastAdminInvariantViolation,
    NotFound,
    Validation,
    SetupAlreadyDone,
    StorageFailure,
}

/// A field-level validation failure, e.g. `{ field: "email", validator: "unique" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub validator: &'static str,
}

impl ServiceError {
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied(reason.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::SessionInvalidOrExpired => ErrorKind::SessionInvalidOrExpired,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::LastAdminInvariantViolation => ErrorKind::LastAdminInvariantViolation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::EmailAlreadyInUse
            | Self::UsernameAlreadyInUse
            | Self::EmptyLabelName
            | Self::InvalidSearchQuery(_) => {
                ErrorKind::Validation
            }
            Self::SetupAlreadyDone => ErrorKind::SetupAlreadyDone,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }

    /// Present for validation-class errors only.
    #[must_use]
    pub const fn field_error(&self) -> Option<FieldError> {
        match self {
            Self::EmailAlreadyInUse => Some(FieldError {
                field: "email",
                validator: "unique",
            }),
            Self::UsernameAlreadyInUse => Some(FieldError {
                field: "username",
                validator: "unique",
            }),
            Self::EmptyLabelName => Some(FieldError {
                field: "name",
                validator: "required",
            }),
            Self::InvalidSearchQuery(_) => Some(FieldError {
                field: "q",
                validator: "search",
            }),
            _ => None,
        }
    }
}

/// Storage faults are logged once at the service boundary; rule violations
/// are the caller's business and stay quiet.
pub fn log_failure(operation: &str, err: &ServiceError) {
    if let ServiceError::StorageFailure(message) = err {
        tracing::error!(operation, "Storage failure: {}", message);
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::StorageFailure(err.to_string())
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageFailure(format!("{err:#}"))
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        Self::InvalidSearchQuery(err.key().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniqueness_errors_are_field_tagged() {
        let email = ServiceError::EmailAlreadyInUse.field_error().unwrap();
        assert_eq!((email.field, email.validator), ("email", "unique"));

        let username = ServiceError::UsernameAlreadyInUse.field_error().unwrap();
        assert_eq!((username.field, username.validator), ("username", "unique"));

        assert_eq!(ServiceError::EmailAlreadyInUse.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_query_error_maps_to_search_field() {
        let err = ServiceError::from(QueryError::UnknownKey("owner".to_string()));
        assert!(matches!(&err, ServiceError::InvalidSearchQuery(key) if key == "owner"));
        let field = err.field_error().unwrap();
        assert_eq!((field.field, field.validator), ("q", "search"));
    }

    #[test]
    fn test_flat_errors_have_no_field() {
        assert!(ServiceError::NotFound(Resource::Ticket).field_error().is_none());
        assert!(ServiceError::permission_denied("nope").field_error().is_none());
        assert_eq!(
            ServiceError::LastAdminInvariantViolation.kind(),
            ErrorKind::LastAdminInvariantViolation
        );
    }

    #[test]
    fn test_storage_errors_are_catch_all() {
        let err = ServiceError::from(sea_orm::DbErr::Custom("disk I/O error".to_string()));
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert_eq!(
            ServiceError::NotFound(Resource::Comment).to_string(),
            "comment not found"
        );
    }
}
