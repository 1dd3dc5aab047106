//! Set-membership tables: favorites, shopping cart and follows.
//!
//! Every write is idempotent. Adds report whether a row was created,
//! removes whether a row was deleted, so handlers can pick status codes
//! without a separate existence query.

use sqlx::PgPool;

use pantry_core::{RecipeId, UserId};

use super::users::UserRow;
use super::{RepositoryError, map_constraint_error};
use crate::models::{User, UserView};

/// A per-user list of recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    const fn table(self) -> &'static str {
        match self {
            Self::Favorites => "pantry.favorite",
            Self::ShoppingCart => "pantry.cart_entry",
        }
    }
}

/// Repository for favorites and the shopping cart.
pub struct RecipeListRepository<'a> {
    pool: &'a PgPool,
    list: RecipeList,
}

impl<'a> RecipeListRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, list: RecipeList) -> Self {
        Self { pool, list }
    }

    /// Add a recipe. Returns `true` if it was not already in the list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the recipe or user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(&self, user: UserId, recipe: RecipeId) -> Result<bool, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            self.list.table()
        );

        let result = sqlx::query(&sql)
            .bind(user)
            .bind(recipe)
            .execute(self.pool)
            .await
            .map_err(|e| map_constraint_error(e, &[]))?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove a recipe. Returns `true` if it was in the list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user: UserId, recipe: RecipeId) -> Result<bool, RepositoryError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            self.list.table()
        );

        let result = sqlx::query(&sql)
            .bind(user)
            .bind(recipe)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Follows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct FollowedRow {
    #[sqlx(flatten)]
    author: UserRow,
    recipes_count: i64,
}

/// Repository for subscriptions between users.
pub struct FollowRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FollowRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Follow an author. Returns `true` if the follow is new.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when following oneself or an
    /// unknown author.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn follow(&self, user: UserId, author: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO pantry.follow (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(user)
        .bind(author)
        .execute(self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(e, &[("follow_not_self", "you cannot subscribe to yourself")])
        })?;

        Ok(result.rows_affected() == 1)
    }

    /// Stop following an author. Returns `true` if a follow existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unfollow(&self, user: UserId, author: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pantry.follow WHERE user_id = $1 AND author_id = $2")
            .bind(user)
            .bind(author)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Authors followed by `user`, ordered by username, with their recipe counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored profile is invalid.
    pub async fn followed_authors(
        &self,
        user: UserId,
    ) -> Result<Vec<(UserView, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, FollowedRow>(
            r"
            SELECT a.id, a.email, a.username, a.first_name, a.last_name, a.created_at,
                   (SELECT COUNT(*) FROM pantry.recipe r WHERE r.author_id = a.id) AS recipes_count
            FROM pantry.follow f
            JOIN pantry.account a ON a.id = f.author_id
            WHERE f.user_id = $1
            ORDER BY a.username
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let author: User = row.author.try_into()?;
                Ok((UserView::new(author, true), row.recipes_count))
            })
            .collect()
    }
}
