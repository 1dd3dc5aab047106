//! Shopping list aggregation over a pluggable store.
//!
//! The aggregator only reads. It asks the store for the recipes in a cart,
//! then for each recipe's ingredient lines, and hands the flattened lines
//! to [`pantry_core::shopping::aggregate`].

use std::future::Future;

use chrono::NaiveDate;
use pantry_core::shopping::{self, AggregatedLine, IngredientLine};
use pantry_core::{RecipeId, UserId};

use crate::db::RepositoryError;

/// Read access the aggregator needs from persistence.
pub trait ShoppingListStore: Send + Sync {
    /// Recipes currently in the user's cart.
    fn list_cart_entries(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<RecipeId>, RepositoryError>> + Send;

    /// Ingredient lines of one recipe.
    fn list_ingredient_lines(
        &self,
        recipe_id: RecipeId,
    ) -> impl Future<Output = Result<Vec<IngredientLine>, RepositoryError>> + Send;
}

/// Builds consolidated shopping lists from a user's cart.
pub struct ShoppingListAggregator<S> {
    store: S,
}

impl<S: ShoppingListStore> ShoppingListAggregator<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Merge the ingredient lines of every recipe in the user's cart.
    ///
    /// An empty cart yields an empty list.
    ///
    /// # Errors
    ///
    /// Propagates the first store failure unchanged.
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn build_shopping_list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AggregatedLine>, RepositoryError> {
        let recipes = self.store.list_cart_entries(user_id).await?;

        let mut lines = Vec::new();
        for recipe_id in &recipes {
            lines.extend(self.store.list_ingredient_lines(*recipe_id).await?);
        }

        let input_lines = lines.len();
        let aggregated = shopping::aggregate(lines);
        tracing::debug!(
            recipes = recipes.len(),
            input_lines,
            output_lines = aggregated.len(),
            "Shopping list aggregated"
        );

        Ok(aggregated)
    }

    /// Render aggregated lines as a dated text document.
    #[must_use]
    pub fn render_as_text(lines: &[AggregatedLine], as_of: NaiveDate) -> Vec<u8> {
        shopping::render_text(lines, as_of)
    }

    /// Give the store back, e.g. to close its transaction.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use pantry_core::Amount;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        carts: HashMap<UserId, Vec<RecipeId>>,
        recipes: HashMap<RecipeId, Vec<IngredientLine>>,
        fail_on: Option<RecipeId>,
    }

    impl MemoryStore {
        fn with_recipe(mut self, id: i32, lines: &[(&str, &str, i64)]) -> Self {
            let lines = lines
                .iter()
                .map(|(name, unit, amount)| IngredientLine {
                    name: (*name).to_owned(),
                    measurement_unit: (*unit).to_owned(),
                    amount: Amount::new(*amount).unwrap(),
                })
                .collect();
            self.recipes.insert(RecipeId::new(id), lines);
            self
        }

        fn with_cart(mut self, user: i32, recipes: &[i32]) -> Self {
            self.carts.insert(
                UserId::new(user),
                recipes.iter().copied().map(RecipeId::new).collect(),
            );
            self
        }
    }

    impl ShoppingListStore for MemoryStore {
        async fn list_cart_entries(&self, user_id: UserId) -> Result<Vec<RecipeId>, RepositoryError> {
            Ok(self.carts.get(&user_id).cloned().unwrap_or_default())
        }

        async fn list_ingredient_lines(
            &self,
            recipe_id: RecipeId,
        ) -> Result<Vec<IngredientLine>, RepositoryError> {
            if self.fail_on == Some(recipe_id) {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.recipes.get(&recipe_id).cloned().unwrap_or_default())
        }
    }

    fn line(name: &str, unit: &str, amount: u64) -> AggregatedLine {
        AggregatedLine {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    fn pancakes_and_cookies() -> MemoryStore {
        MemoryStore::default()
            .with_recipe(1, &[("Flour", "g", 200), ("Salt", "g", 5)])
            .with_recipe(2, &[("Flour", "g", 100), ("Sugar", "g", 50)])
    }

    #[tokio::test]
    async fn test_sums_shared_ingredients_across_cart() {
        let aggregator = ShoppingListAggregator::new(pancakes_and_cookies().with_cart(7, &[1, 2]));

        let lines = aggregator.build_shopping_list(UserId::new(7)).await.unwrap();

        assert_eq!(
            lines,
            vec![line("Flour", "g", 300), line("Salt", "g", 5), line("Sugar", "g", 50)]
        );
    }

    #[tokio::test]
    async fn test_empty_cart_gives_empty_list() {
        let aggregator = ShoppingListAggregator::new(pancakes_and_cookies());

        let lines = aggregator.build_shopping_list(UserId::new(7)).await.unwrap();

        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_cart_order_does_not_change_result() {
        let forward = ShoppingListAggregator::new(pancakes_and_cookies().with_cart(1, &[1, 2]));
        let backward = ShoppingListAggregator::new(pancakes_and_cookies().with_cart(1, &[2, 1]));

        assert_eq!(
            forward.build_shopping_list(UserId::new(1)).await.unwrap(),
            backward.build_shopping_list(UserId::new(1)).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_only_the_requested_cart_is_used() {
        let store = pancakes_and_cookies().with_cart(1, &[1]).with_cart(2, &[2]);
        let aggregator = ShoppingListAggregator::new(store);

        let lines = aggregator.build_shopping_list(UserId::new(2)).await.unwrap();

        assert_eq!(lines, vec![line("Flour", "g", 100), line("Sugar", "g", 50)]);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = pancakes_and_cookies().with_cart(1, &[1, 2]);
        store.fail_on = Some(RecipeId::new(2));
        let aggregator = ShoppingListAggregator::new(store);

        let result = aggregator.build_shopping_list(UserId::new(1)).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn test_rendered_document() {
        let aggregator = ShoppingListAggregator::new(pancakes_and_cookies().with_cart(3, &[2, 1]));
        let lines = aggregator.build_shopping_list(UserId::new(3)).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();

        let doc = ShoppingListAggregator::<MemoryStore>::render_as_text(&lines, date);

        assert_eq!(
            String::from_utf8(doc).unwrap(),
            "Shopping list for 01.05.2026\n1. Flour (g) — 300\n2. Salt (g) — 5\n3. Sugar (g) — 50"
        );
    }
}
