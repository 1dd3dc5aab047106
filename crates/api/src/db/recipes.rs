//! Recipe repository for database operations.
//!
//! Reads are always relative to an optional viewer: the `is_favorited`,
//! `is_in_shopping_cart` and author `is_subscribed` flags are computed in
//! the same query and are `false` for anonymous viewers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use pantry_core::{Amount, CookingTime, IngredientId, RecipeId, RecipeImage, UserId};

use super::users::UserRow;
use super::{RepositoryError, map_constraint_error};
use crate::models::{
    NewRecipe, Recipe, RecipeFilter, RecipeIngredient, RecipeLine, RecipePatch, RecipeSummary,
    UserView,
};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Recipe joined with its author and the viewer's flags.
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: RecipeId,
    name: String,
    image: RecipeImage,
    text: String,
    cooking_time: CookingTime,
    pub_date: DateTime<Utc>,
    author_id: i32,
    author_email: String,
    author_username: String,
    author_first_name: String,
    author_last_name: String,
    author_created_at: DateTime<Utc>,
    author_is_subscribed: bool,
    is_favorited: bool,
    is_in_shopping_cart: bool,
}

impl RecipeRow {
    fn into_recipe(self, ingredients: Vec<RecipeIngredient>) -> Result<Recipe, RepositoryError> {
        let author = UserRow {
            id: self.author_id,
            email: self.author_email,
            username: self.author_username,
            first_name: self.author_first_name,
            last_name: self.author_last_name,
            created_at: self.author_created_at,
        };

        Ok(Recipe {
            id: self.id,
            author: UserView::new(author.try_into()?, self.author_is_subscribed),
            name: self.name,
            image: self.image,
            text: self.text,
            cooking_time: self.cooking_time,
            pub_date: self.pub_date,
            ingredients,
            is_favorited: self.is_favorited,
            is_in_shopping_cart: self.is_in_shopping_cart,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct IngredientLineRow {
    recipe_id: RecipeId,
    ingredient_id: IngredientId,
    name: String,
    measurement_unit: String,
    amount: Amount,
}

/// Shared projection; `$1` is the viewer (nullable).
const RECIPE_SELECT: &str = r"
    SELECT r.id, r.name, r.image, r.text, r.cooking_time, r.pub_date,
           a.id AS author_id,
           a.email AS author_email,
           a.username AS author_username,
           a.first_name AS author_first_name,
           a.last_name AS author_last_name,
           a.created_at AS author_created_at,
           EXISTS (
               SELECT 1 FROM pantry.follow f
               WHERE f.user_id = $1 AND f.author_id = a.id
           ) AS author_is_subscribed,
           EXISTS (
               SELECT 1 FROM pantry.favorite fv
               WHERE fv.user_id = $1 AND fv.recipe_id = r.id
           ) AS is_favorited,
           EXISTS (
               SELECT 1 FROM pantry.cart_entry c
               WHERE c.user_id = $1 AND c.recipe_id = r.id
           ) AS is_in_shopping_cart
    FROM pantry.recipe r
    JOIN pantry.account a ON a.id = r.author_id
";

const LINE_CONSTRAINT_MESSAGES: &[(&str, &str)] = &[
    ("recipe_ingredient_unique", "ingredients must not repeat"),
    (
        "recipe_ingredient_ingredient_id_fkey",
        "ingredients reference an unknown ingredient",
    ),
];

// =============================================================================
// Repository
// =============================================================================

/// Repository for recipe database operations.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List recipes newest first, as seen by `viewer`.
    ///
    /// Membership filters are ignored for anonymous viewers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if an author profile is invalid.
    pub async fn list(
        &self,
        viewer: Option<UserId>,
        filter: RecipeFilter,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let favorited_only = filter.favorited_only && viewer.is_some();
        let in_cart_only = filter.in_cart_only && viewer.is_some();

        let sql = format!(
            r"
            SELECT * FROM ({RECIPE_SELECT}) listed
            WHERE ($2::INT IS NULL OR listed.author_id = $2)
              AND (NOT $3 OR listed.is_favorited)
              AND (NOT $4 OR listed.is_in_shopping_cart)
            ORDER BY listed.pub_date DESC, listed.id DESC
            "
        );

        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(viewer)
            .bind(filter.author)
            .bind(favorited_only)
            .bind(in_cart_only)
            .fetch_all(self.pool)
            .await?;

        let ids: Vec<RecipeId> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.ingredient_lines(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let ingredients = lines.remove(&row.id).unwrap_or_default();
                row.into_recipe(ingredients)
            })
            .collect()
    }

    /// Get a recipe by its ID, as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the author profile is invalid.
    pub async fn get(
        &self,
        id: RecipeId,
        viewer: Option<UserId>,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let sql = format!("{RECIPE_SELECT} WHERE r.id = $2");

        let Some(row) = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(viewer)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let ingredients = self
            .ingredient_lines(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        row.into_recipe(ingredients).map(Some)
    }

    /// Get the compact card of a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, id: RecipeId) -> Result<Option<RecipeSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, RecipeSummary>(
            "SELECT id, name, image, cooking_time FROM pantry.recipe WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get the author of a recipe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn author_of(&self, id: RecipeId) -> Result<Option<UserId>, RepositoryError> {
        let author = sqlx::query_scalar::<_, UserId>(
            "SELECT author_id FROM pantry.recipe WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(author)
    }

    /// Publish a recipe with its ingredient lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a line repeats an ingredient or
    /// references an unknown one.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        author: UserId,
        recipe: &NewRecipe,
    ) -> Result<RecipeId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, RecipeId>(
            r"
            INSERT INTO pantry.recipe (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(author)
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        insert_lines(&mut tx, id, &recipe.ingredients).await?;
        tx.commit().await?;

        tracing::debug!(recipe_id = %id, lines = recipe.ingredients.len(), "Recipe created");
        Ok(id)
    }

    /// Apply a partial update. A present ingredient list replaces all lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe does not exist.
    /// Returns `RepositoryError::Conflict` for invalid ingredient lines.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: RecipeId, patch: &RecipePatch) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE pantry.recipe
            SET name = COALESCE($2, name),
                text = COALESCE($3, text),
                cooking_time = COALESCE($4, cooking_time),
                image = COALESCE($5, image)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.text.as_deref())
        .bind(patch.cooking_time)
        .bind(patch.image.as_ref())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        if let Some(lines) = &patch.ingredients {
            sqlx::query("DELETE FROM pantry.recipe_ingredient WHERE recipe_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_lines(&mut tx, id, lines).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a recipe. Dependent rows cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipe does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: RecipeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pantry.recipe WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Latest recipes of each given author, at most `limit` per author.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_by_authors(
        &self,
        authors: &[UserId],
        limit: Option<i64>,
    ) -> Result<HashMap<UserId, Vec<RecipeSummary>>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            author_id: UserId,
            #[sqlx(flatten)]
            summary: RecipeSummary,
        }

        let raw: Vec<i32> = authors.iter().map(UserId::as_i32).collect();
        let rows = sqlx::query_as::<_, Row>(
            r"
            SELECT author_id, id, name, image, cooking_time
            FROM (
                SELECT r.*, ROW_NUMBER() OVER (
                    PARTITION BY r.author_id ORDER BY r.pub_date DESC, r.id DESC
                ) AS position
                FROM pantry.recipe r
                WHERE r.author_id = ANY($1)
            ) ranked
            WHERE $2::BIGINT IS NULL OR position <= $2
            ORDER BY author_id, position
            ",
        )
        .bind(raw)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let mut by_author: HashMap<UserId, Vec<RecipeSummary>> = HashMap::new();
        for row in rows {
            by_author.entry(row.author_id).or_default().push(row.summary);
        }
        Ok(by_author)
    }

    /// Load ingredient lines for several recipes in one round trip, grouped
    /// by recipe in insertion order.
    async fn ingredient_lines(
        &self,
        ids: &[RecipeId],
    ) -> Result<HashMap<RecipeId, Vec<RecipeIngredient>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw: Vec<i32> = ids.iter().map(RecipeId::as_i32).collect();
        let rows = sqlx::query_as::<_, IngredientLineRow>(
            r"
            SELECT ri.recipe_id, i.id AS ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM pantry.recipe_ingredient ri
            JOIN pantry.ingredient i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.recipe_id, ri.id
            ",
        )
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<RecipeId, Vec<RecipeIngredient>> = HashMap::new();
        for row in rows {
            grouped.entry(row.recipe_id).or_default().push(RecipeIngredient {
                id: row.ingredient_id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            });
        }
        Ok(grouped)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: RecipeId,
    lines: &[RecipeLine],
) -> Result<(), RepositoryError> {
    let (ingredient_ids, amounts): (Vec<i32>, Vec<i16>) = lines
        .iter()
        .map(|line| (line.ingredient_id.as_i32(), line.amount.get()))
        .unzip();

    sqlx::query(
        r"
        INSERT INTO pantry.recipe_ingredient (recipe_id, ingredient_id, amount)
        SELECT $1, line.ingredient_id, line.amount
        FROM UNNEST($2::INT[], $3::SMALLINT[]) WITH ORDINALITY
             AS line(ingredient_id, amount, position)
        ORDER BY line.position
        ",
    )
    .bind(recipe_id)
    .bind(ingredient_ids)
    .bind(amounts)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_constraint_error(e, LINE_CONSTRAINT_MESSAGES))?;

    Ok(())
}
