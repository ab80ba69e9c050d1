//! Pickles CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront and session-store migrations
//! pickles-cli migrate
//!
//! # Create an admin account
//! pickles-cli admin create -u admin -p 's3cret'
//!
//! # Load products from a YAML file
//! pickles-cli seed products -f seed/products.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin accounts (the only way to get one)
//! - `seed products` - Add products from YAML, skipping names already present

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pickles-cli")]
#[command(author, version, about = "Pickles storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin password
        #[arg(short, long, env = "PICKLES_ADMIN_PASSWORD")]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Add products from a YAML file
    Products {
        /// Path to the YAML file
        #[arg(short, long, default_value = "seed/products.yaml")]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
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
        Commands::Admin { action } => match action {
            AdminAction::Create { username, password } => {
                commands::admin::create_user(&username, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
