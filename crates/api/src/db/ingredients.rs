//! Ingredient catalog repository.

use std::collections::HashSet;

use sqlx::PgPool;

use pantry_core::IngredientId;

use super::RepositoryError;
use crate::models::Ingredient;

/// Repository for the ingredient catalog.
pub struct IngredientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IngredientRepository<'a> {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List ingredients ordered by name, optionally narrowed to names that
    /// start with `prefix` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, RepositoryError> {
        let pattern = prefix
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}%", escape_like(p)));

        let rows = sqlx::query_as::<_, Ingredient>(
            r"
            SELECT id, name, measurement_unit
            FROM pantry.ingredient
            WHERE $1::TEXT IS NULL OR LOWER(name) LIKE LOWER($1) ESCAPE '\'
            ORDER BY name, measurement_unit
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get an ingredient by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: IngredientId) -> Result<Option<Ingredient>, RepositoryError> {
        let row = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM pantry.ingredient WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Return the subset of `ids` present in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn existing_ids(
        &self,
        ids: &[IngredientId],
    ) -> Result<HashSet<IngredientId>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(IngredientId::as_i32).collect();

        let found = sqlx::query_scalar::<_, IngredientId>(
            "SELECT id FROM pantry.ingredient WHERE id = ANY($1)",
        )
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(found.into_iter().collect())
    }

    /// Insert catalog entries, skipping `(name, measurement_unit)` pairs that
    /// already exist. Returns the number of rows actually inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn bulk_insert(&self, entries: &[(String, String)]) -> Result<u64, RepositoryError> {
        let (names, units): (Vec<&str>, Vec<&str>) = entries
            .iter()
            .map(|(name, unit)| (name.as_str(), unit.as_str()))
            .unzip();

        let result = sqlx::query(
            r"
            INSERT INTO pantry.ingredient (name, measurement_unit)
            SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[])
            ON CONFLICT ON CONSTRAINT ingredient_name_unit_unique DO NOTHING
            ",
        )
        .bind(names)
        .bind(units)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Total number of catalog entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pantry.ingredient")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
