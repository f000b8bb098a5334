mod migrate;
mod sessions;
mod setup;
mod tickets;
mod users;

pub use migrate::cmd_migrate;
pub use sessions::cmd_purge_sessions;
pub use setup::cmd_setup;
pub use tickets::cmd_list_tickets;
pub use users::{CreateUserArgs, cmd_create_user, cmd_list_users};

/// Environment variable consulted when `--password` is not given.
pub const PASSWORD_ENV: &str = "TICKETDESK_PASSWORD";

fn resolve_password(flag: Option<String>) -> anyhow::Result<String> {
    flag.or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|password| !password.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No password given; pass --password or set {PASSWORD_ENV}"))
}
