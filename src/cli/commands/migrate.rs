//! Migrate command handler

use crate::state::SharedState;

pub async fn cmd_migrate(state: &SharedState) -> anyhow::Result<()> {
    state.store.ping().await?;

    println!(
        "✓ Database at {} is up to date",
        state.config.general.database_path
    );

    Ok(())
}
