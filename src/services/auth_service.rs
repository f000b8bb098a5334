//! Domain service for authentication.
//!
//! Handles first-run setup, login, session validation and logout. Only the
//! SHA-256 of a session token is ever stored.

use crate::constants::{SESSION_COOKIE_NAME, SESSION_TOKEN_HEADER};
use crate::domain::{LoginResult, SetupRequest, Status, UserInfo};
use crate::services::error::ServiceError;

/// Where the request layer found the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCredential {
    /// Carried in the [`SESSION_TOKEN_HEADER`] header.
    Header(String),
    /// Carried in the [`SESSION_COOKIE_NAME`] cookie.
    Cookie(String),
}

impl SessionCredential {
    /// Picks the credential from the raw header and cookie values. The header
    /// wins when both are present; blank values count as absent.
    #[must_use]
    pub fn from_sources(header: Option<&str>, cookie: Option<&str>) -> Option<Self> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        present(header)
            .map(|token| Self::Header(token.to_string()))
            .or_else(|| present(cookie).map(|token| Self::Cookie(token.to_string())))
    }

    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Header(token) | Self::Cookie(token) => token,
        }
    }

    /// Name of the carrier, for diagnostics. Never the token itself.
    #[must_use]
    pub const fn source(&self) -> &'static str {
        match self {
            Self::Header(_) => SESSION_TOKEN_HEADER,
            Self::Cookie(_) => SESSION_COOKIE_NAME,
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates the first account, always as admin.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SetupAlreadyDone`] once any user exists.
    async fn setup(&self, request: SetupRequest) -> Result<UserInfo, ServiceError>;

    /// Reports whether setup has happened and who the token belongs to.
    async fn status(&self, token: Option<&str>) -> Result<Status, ServiceError>;

    /// Verifies credentials and opens a new session.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidCredentials`] for an unknown email or a
    /// wrong password, without telling the two apart.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, ServiceError>;

    /// Resolves a raw token to its user. Unknown, wrong and expired tokens
    /// all yield `None`.
    async fn authenticate(&self, token: &str) -> Result<Option<UserInfo>, ServiceError>;

    async fn authenticate_credential(
        &self,
        credential: &SessionCredential,
    ) -> Result<Option<UserInfo>, ServiceError> {
        self.authenticate(credential.token()).await
    }

    /// Like [`AuthService::authenticate_credential`], but a missing user is
    /// an error.
    async fn require_user(
        &self,
        credential: Option<&SessionCredential>,
    ) -> Result<UserInfo, ServiceError> {
        let Some(credential) = credential else {
            return Err(ServiceError::SessionInvalidOrExpired);
        };

        self.authenticate_credential(credential)
            .await?
            .ok_or(ServiceError::SessionInvalidOrExpired)
    }

    /// Revokes the session behind `token`. Returns whether one existed.
    async fn logout(&self, token: &str) -> Result<bool, ServiceError>;

    /// Deletes every expired session and returns how many were removed.
    async fn purge_expired_sessions(&self) -> Result<u64, ServiceError>;
}
