//! CLI module - Command-line interface for ticketdesk
//!
//! Operator commands only; request handling lives in the embedding server.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Role;

/// ticketdesk - helpdesk ticket engine
#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database if needed and apply pending migrations
    Migrate,

    /// Create the first admin account
    Setup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Falls back to the TICKETDESK_PASSWORD environment variable
        #[arg(long)]
        password: Option<String>,
    },

    /// Create a user on behalf of an existing admin
    CreateUser {
        /// Username of the admin performing the action
        #[arg(long = "as")]
        admin: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "member")]
        role: Role,
        /// Falls back to the TICKETDESK_PASSWORD environment variable
        #[arg(long)]
        password: Option<String>,
    },

    /// List all users
    Users,

    /// List tickets, optionally filtered by a search expression
    #[command(alias = "ls")]
    Tickets {
        /// e.g. `label:bug,request crash`
        query: Vec<String>,
    },

    /// Delete expired sessions
    PurgeSessions,
}

pub use commands::*;
