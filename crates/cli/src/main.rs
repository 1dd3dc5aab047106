//! Pantry CLI - Database migrations and reference data tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! pantry-cli migrate
//!
//! # Load the ingredient catalog
//! pantry-cli ingredients import data/ingredients.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pantry-cli")]
#[command(author, version, about = "Pantry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the ingredient catalog
    Ingredients {
        #[command(subcommand)]
        action: IngredientAction,
    },
}

#[derive(Subcommand)]
enum IngredientAction {
    /// Import ingredients from a JSON file, skipping existing entries
    Import {
        /// Path to a JSON array of `{name, measurement_unit}` objects
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Ingredients { action } => match action {
            IngredientAction::Import { path } => commands::ingredients::import(&path).await?,
        },
    }
    Ok(())
}
