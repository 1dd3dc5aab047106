//! Recipe domain and response types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pantry_core::{Amount, CookingTime, IngredientId, RecipeId, RecipeImage, UserId};

use super::UserView;

/// Full recipe as returned to clients, relative to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub author: UserView,
    pub name: String,
    pub image: RecipeImage,
    pub text: String,
    pub cooking_time: CookingTime,
    pub pub_date: DateTime<Utc>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// One ingredient line of a recipe, joined with the catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredient {
    /// Catalog ingredient ID.
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: Amount,
}

/// Compact recipe card used by favorites, cart and subscription previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: RecipeImage,
    pub cooking_time: CookingTime,
}

/// Ingredient reference plus amount, as submitted by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeLine {
    pub ingredient_id: IngredientId,
    pub amount: Amount,
}

/// Validated input for publishing a recipe.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: CookingTime,
    pub image: RecipeImage,
    pub ingredients: Vec<RecipeLine>,
}

/// Validated partial update. `None` leaves the field unchanged; a present
/// `ingredients` list replaces every line.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<CookingTime>,
    pub image: Option<RecipeImage>,
    pub ingredients: Option<Vec<RecipeLine>>,
}

/// Filters accepted by the recipe listing.
///
/// The membership flags only narrow the list for an authenticated viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    pub favorited_only: bool,
    pub in_cart_only: bool,
}
