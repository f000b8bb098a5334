//! Setup command handler

use crate::domain::SetupRequest;
use crate::services::ServiceError;
use crate::state::SharedState;

use super::resolve_password;

pub async fn cmd_setup(
    state: &SharedState,
    name: String,
    username: String,
    email: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    let request = SetupRequest {
        name,
        username,
        email,
        password: resolve_password(password)?,
    };

    match state.auth_service.setup(request).await {
        Ok(user) => {
            println!("✓ Admin '{}' created (ID: {})", user.username, user.id);
            Ok(())
        }
        Err(ServiceError::SetupAlreadyDone) => {
            println!("Setup has already been completed.");
            println!("Create more users with: ticketdesk create-user --as <admin> ...");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
