//! Database operations for the Pantry `PostgreSQL` schema.
//!
//! # Schema: `pantry`
//!
//! ## Tables
//!
//! - `account` - Registered users (identity is asserted upstream)
//! - `ingredient` - Ingredient catalog, unique per `(name, measurement_unit)`
//! - `recipe` - Published recipes
//! - `recipe_ingredient` - Ingredient lines of a recipe
//! - `favorite` - User favorites
//! - `cart_entry` - Recipes in a user's shopping cart
//! - `follow` - Subscriptions between users
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p pantry-cli -- migrate
//! ```

pub mod ingredients;
pub mod recipes;
pub mod relations;
pub mod shopping_list;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use ingredients::IngredientRepository;
pub use recipes::RecipeRepository;
pub use relations::{FollowRepository, RecipeList, RecipeListRepository};
pub use shopping_list::PgShoppingListStore;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique or foreign-key violation to `RepositoryError::Conflict`.
///
/// The constraint name picks the message; unknown constraints fall back
/// to the database's own wording.
pub(crate) fn map_constraint_error(e: sqlx::Error, messages: &[(&str, &str)]) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation()
            || db_err.is_foreign_key_violation()
            || db_err.is_check_violation())
    {
        let message = db_err
            .constraint()
            .and_then(|name| messages.iter().find(|(c, _)| *c == name))
            .map_or_else(|| db_err.message().to_owned(), |(_, m)| (*m).to_owned());
        return RepositoryError::Conflict(message);
    }
    RepositoryError::Database(e)
}
