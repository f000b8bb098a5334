//! User command handlers

use crate::domain::{NewUser, Role, UserInfo};
use crate::state::SharedState;

use super::resolve_password;

pub struct CreateUserArgs {
    pub admin: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password: Option<String>,
}

pub async fn cmd_create_user(state: &SharedState, args: CreateUserArgs) -> anyhow::Result<()> {
    let admin = args.admin.as_str();
    let actor: UserInfo = state
        .store
        .users()
        .get_by_username(admin)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user named '{admin}'"))?
        .into();

    let user = NewUser {
        name: args.name,
        username: args.username,
        email: args.email,
        password: resolve_password(args.password)?,
        role: args.role,
    };

    let created = state.user_service.create_user(&actor, user).await?;

    println!(
        "✓ User '{}' created (ID: {}, role: {})",
        created.username, created.id, created.role
    );

    Ok(())
}

pub async fn cmd_list_users(state: &SharedState) -> anyhow::Result<()> {
    let users = state.user_service.list_users().await?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!("Create the first admin with: ticketdesk setup --name ... --username ... --email ...");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let marker = match user.role {
            Role::Admin => "★",
            Role::Member => "•",
        };

        println!("{} {} <{}>", marker, user.name, user.email);
        println!("  ID: {} | Username: {} | Role: {}", user.id, user.username, user.role);
    }

    Ok(())
}
