//! Kedai CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! kedai-cli migrate
//!
//! # Load products from a YAML file
//! kedai-cli seed products catalog.yaml
//!
//! # Create a user, then promote them
//! kedai-cli user create -u budi -e budi@example.com
//! kedai-cli user role -u budi -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `KEDAI_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kedai_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "kedai-cli")]
#[command(author, version, about = "Kedai CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load data into the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage store users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        /// Path to the YAML file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Role (`customer`, `admin`)
        #[arg(short, long, default_value = "customer")]
        role: UserRole,
    },
    /// Change a user's role
    Role {
        /// Username
        #[arg(short, long)]
        username: String,

        /// New role (`customer`, `admin`)
        #[arg(short, long)]
        role: UserRole,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => {
                commands::seed::products(&file).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                role,
            } => {
                commands::user::create(&username, &email, role).await?;
            }
            UserAction::Role { username, role } => {
                commands::user::set_role(&username, role).await?;
            }
        },
    }
    Ok(())
}
