//! Session maintenance command handler

use crate::state::SharedState;

pub async fn cmd_purge_sessions(state: &SharedState) -> anyhow::Result<()> {
    let purged = state.auth_service.purge_expired_sessions().await?;

    if purged == 0 {
        println!("No expired sessions.");
    } else {
        println!("✓ Removed {purged} expired session(s)");
    }

    Ok(())
}
