pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod policy;
pub mod query;
pub mod services;
pub mod state;

pub use cli::Cli;
pub use config::Config;
pub use state::SharedState;

use cli::Commands;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Loads the file given with `--config`, or searches the default locations.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    Ok(config)
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.general.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting ticketdesk v{}", env!("CARGO_PKG_VERSION"));

    let state = SharedState::new(config).await?;

    match cli.command {
        Commands::Migrate => cli::cmd_migrate(&state).await,
        Commands::Setup {
            name,
            username,
            email,
            password,
        } => cli::cmd_setup(&state, name, username, email, password).await,
        Commands::CreateUser {
            admin,
            name,
            username,
            email,
            role,
            password,
        } => {
            let args = cli::CreateUserArgs {
                admin,
                name,
                username,
                email,
                role,
                password,
            };
            cli::cmd_create_user(&state, args).await
        }
        Commands::Users => cli::cmd_list_users(&state).await,
        Commands::Tickets { query } => cli::cmd_list_tickets(&state, &query.join(" ")).await,
        Commands::PurgeSessions => cli::cmd_purge_sessions(&state).await,
    }
}
