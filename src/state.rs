use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CommentService, SeaOrmAuthService, SeaOrmCommentService, SeaOrmTicketService,
    SeaOrmUserService, TicketService, UserService,
};

/// Everything a request handler needs: the store and one instance of each
/// service. Cheap to clone.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub ticket_service: Arc<dyn TicketService>,

    pub comment_service: Arc<dyn CommentService>,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    /// Connects to the configured database (running migrations) and wires
    /// the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let security = config.security.clone();

        Self {
            auth_service: Arc::new(SeaOrmAuthService::new(store.clone(), security.clone())),
            ticket_service: Arc::new(SeaOrmTicketService::new(store.clone())),
            comment_service: Arc::new(SeaOrmCommentService::new(store.clone())),
            user_service: Arc::new(SeaOrmUserService::new(store.clone(), security)),
            config: Arc::new(config),
            store,
        }
    }
}
