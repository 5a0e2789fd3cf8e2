//! GameHub CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations (schema and session table)
//! gh-cli migrate
//!
//! # Insert the default games and sample catalog
//! gh-cli seed
//!
//! # Grant a role to a registered user
//! gh-cli role set -e admin@example.com -r admin
//!
//! # List users and their roles
//! gh-cli role list
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed games and sample accounts
//! - `role` - Manage checker and admin grants

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gh-cli")]
#[command(author, version, about = "GameHub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed games and sample accounts
    Seed {
        /// Only insert games, skip the sample catalog
        #[arg(long)]
        games_only: bool,
    },
    /// Manage user roles
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Grant a role to a registered user
    Set {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// Role (`user`, `checker`, `admin`)
        #[arg(short, long)]
        role: String,
    },
    /// List every user with their role
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { games_only } => commands::seed::run(games_only).await?,
        Commands::Role { action } => match action {
            RoleAction::Set { email, role } => commands::role::set(&email, &role).await?,
            RoleAction::List => commands::role::list().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_role_set() {
        let cli = Cli::try_parse_from(["gh-cli", "role", "set", "-e", "a@b.com", "-r", "checker"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Role {
                action: RoleAction::Set { .. }
            })
        ));
    }
}
