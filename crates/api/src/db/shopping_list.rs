//! `PostgreSQL` store backing the shopping list aggregator.
//!
//! All reads run inside one `REPEATABLE READ, READ ONLY` transaction, so a
//! single aggregation sees one snapshot of the cart and its recipes even
//! when other requests edit them concurrently.

use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use pantry_core::{Amount, IngredientLine, RecipeId, UserId};

use super::RepositoryError;
use crate::services::ShoppingListStore;

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    name: String,
    measurement_unit: String,
    amount: Amount,
}

impl From<LineRow> for IngredientLine {
    fn from(row: LineRow) -> Self {
        Self {
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        }
    }
}

/// Snapshot-isolated reader over the cart tables.
pub struct PgShoppingListStore {
    tx: Mutex<Transaction<'static, Postgres>>,
}

impl PgShoppingListStore {
    /// Open the read-only snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction cannot start.
    pub async fn begin(pool: &PgPool) -> Result<Self, RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        Ok(Self { tx: Mutex::new(tx) })
    }

    /// Close the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the commit fails.
    pub async fn finish(self) -> Result<(), RepositoryError> {
        self.tx.into_inner().commit().await?;
        Ok(())
    }
}

impl ShoppingListStore for PgShoppingListStore {
    async fn list_cart_entries(&self, user_id: UserId) -> Result<Vec<RecipeId>, RepositoryError> {
        let mut tx = self.tx.lock().await;

        let recipes = sqlx::query_scalar::<_, RecipeId>(
            r"
            SELECT recipe_id
            FROM pantry.cart_entry
            WHERE user_id = $1
            ORDER BY created_at, recipe_id
            ",
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(recipes)
    }

    async fn list_ingredient_lines(
        &self,
        recipe_id: RecipeId,
    ) -> Result<Vec<IngredientLine>, RepositoryError> {
        let mut tx = self.tx.lock().await;

        let rows = sqlx::query_as::<_, LineRow>(
            r"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM pantry.recipe_ingredient ri
            JOIN pantry.ingredient i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.id
            ",
        )
        .bind(recipe_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
