//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::DatabaseTransaction;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::repositories::session::{generate_token, hash_token};
use crate::db::{self, NewUserRecord, Store, UserRepository};
use crate::domain::{LoginResult, Role, SetupRequest, Status, UserInfo};
use crate::services::auth_service::AuthService;
use crate::services::error::{ServiceError, log_failure};
use crate::services::password::{hash_password_blocking, verify_password_blocking};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn create_first_admin(
        txn: &DatabaseTransaction,
        request: SetupRequest,
        password_hash: String,
    ) -> Result<UserInfo, ServiceError> {
        let users = UserRepository::new(txn);

        if users.count().await? > 0 {
            return Err(ServiceError::SetupAlreadyDone);
        }

        let user = users
            .create(NewUserRecord {
                name: request.name,
                username: request.username,
                email: request.email,
                password_hash,
                role: Role::Admin,
            })
            .await?;

        Ok(user.into())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn setup(&self, request: SetupRequest) -> Result<UserInfo, ServiceError> {
        let password_hash = hash_password_blocking(&request.password, &self.security).await?;

        let txn = self.store.begin().await?;
        let result = Self::create_first_admin(&txn, request, password_hash).await;
        let user = db::finish(txn, result)
            .await
            .inspect_err(|e| log_failure("setup", e))?;

        info!(user_id = user.id, username = %user.username, "Initial admin created");
        Ok(user)
    }

    async fn status(&self, token: Option<&str>) -> Result<Status, ServiceError> {
        let setup = self.store.users().count().await? > 0;

        let user = match token {
            Some(token) => self.authenticate(token).await?,
            None => None,
        };

        Ok(Status { setup, user })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, ServiceError> {
        let Some(user) = self.store.users().get_by_email(email).await? else {
            // Burn the same work as a real verification.
            hash_password_blocking(password, &self.security).await?;
            debug!("Login attempt for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password_blocking(password, &user.password_hash).await? {
            debug!(user_id = user.id, "Login attempt with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(i64::from(self.security.session_ttl_days));

        self.store
            .sessions()
            .create(user.id, &hash_token(&token), expires_at)
            .await
            .map_err(ServiceError::from)
            .inspect_err(|e| log_failure("login", e))?;

        info!(user_id = user.id, "User logged in");

        Ok(LoginResult {
            token,
            user: user.into(),
        })
    }

    async fn authenticate(&self, token: &str) -> Result<Option<UserInfo>, ServiceError> {
        if token.is_empty() {
            return Ok(None);
        }

        let user = self
            .store
            .sessions()
            .get_active_user(&hash_token(token), Utc::now())
            .await?;

        Ok(user.map(UserInfo::from))
    }

    async fn logout(&self, token: &str) -> Result<bool, ServiceError> {
        let removed = self
            .store
            .sessions()
            .delete_by_token_hash(&hash_token(token))
            .await?;

        if removed {
            info!("Session revoked");
        }

        Ok(removed)
    }

    async fn purge_expired_sessions(&self) -> Result<u64, ServiceError> {
        let purged = self.store.sessions().delete_expired(Utc::now()).await?;

        if purged > 0 {
            info!(count = purged, "Purged expired sessions");
        }

        Ok(purged)
    }
}
