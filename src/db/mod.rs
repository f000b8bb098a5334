use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod migrator;
pub mod repositories;

pub use repositories::{
    AssignmentRepository, CommentRepository, LabelRepository, NewUserRecord, SessionRepository,
    TicketRepository, UserChanges, UserRepository,
};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite:")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Opens a transaction scope. Dropping it without [`finish`] rolls back.
    pub async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.conn.begin().await
    }

    #[must_use]
    pub const fn users(&self) -> UserRepository<'_, DatabaseConnection> {
        UserRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn sessions(&self) -> SessionRepository<'_, DatabaseConnection> {
        SessionRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn tickets(&self) -> TicketRepository<'_, DatabaseConnection> {
        TicketRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn labels(&self) -> LabelRepository<'_, DatabaseConnection> {
        LabelRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn assignments(&self) -> AssignmentRepository<'_, DatabaseConnection> {
        AssignmentRepository::new(&self.conn)
    }

    #[must_use]
    pub const fn comments(&self) -> CommentRepository<'_, DatabaseConnection> {
        CommentRepository::new(&self.conn)
    }
}

/// Commits `txn` when `result` is `Ok`, otherwise rolls it back and hands the
/// original error back to the caller.
pub async fn finish<T, E>(txn: DatabaseTransaction, result: Result<T, E>) -> Result<T, E>
where
    E: From<DbErr>,
{
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Transaction rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

/// Current time as stored in `created_at` / `updated_at` columns.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
