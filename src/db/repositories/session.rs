use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};

use crate::constants::limits::SESSION_TOKEN_BYTES;
use crate::db::now_timestamp;
use crate::entities::{prelude::*, sessions, users};

pub struct SessionRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SessionRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<sessions::Model> {
        let active = sessions::ActiveModel {
            user_id: Set(user_id),
            token_hash: Set(token_hash.to_string()),
            expires_at: Set(format_expiry(expires_at)),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        active
            .insert(self.conn)
            .await
            .context("Failed to insert session")
    }

    /// Looks up the user behind a non-expired session with this hash.
    pub async fn get_active_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<users::Model>> {
        let row = Sessions::find()
            .filter(sessions::Column::TokenHash.eq(token_hash))
            .filter(sessions::Column::ExpiresAt.gt(format_expiry(now)))
            .find_also_related(Users)
            .one(self.conn)
            .await
            .context("Failed to query session by token hash")?;

        Ok(row.and_then(|(_, user)| user))
    }

    pub async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool> {
        let result = Sessions::delete_many()
            .filter(sessions::Column::TokenHash.eq(token_hash))
            .exec(self.conn)
            .await
            .context("Failed to delete session")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = Sessions::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(format_expiry(now)))
            .exec(self.conn)
            .await
            .context("Failed to purge expired sessions")?;

        Ok(result.rows_affected)
    }
}

/// Fixed-width UTC form so that SQL string comparison is chronological.
#[must_use]
pub fn format_expiry(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Hex-encoded SHA-256 of a raw session token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    to_hex(&Sha256::digest(token.as_bytes()))
}

/// Generate a random session token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; SESSION_TOKEN_BYTES] = rng.random();

    to_hex(&bytes)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
}
