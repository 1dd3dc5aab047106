//! Domain and response types for the API.
//!
//! Repository row types stay private to `db`; everything here is either a
//! validated domain object or a JSON view returned to clients.

pub mod ingredient;
pub mod recipe;
pub mod user;

pub use ingredient::Ingredient;
pub use recipe::{
    NewRecipe, Recipe, RecipeFilter, RecipeIngredient, RecipeLine, RecipePatch, RecipeSummary,
};
pub use user::{NewUser, Subscription, User, UserView};
