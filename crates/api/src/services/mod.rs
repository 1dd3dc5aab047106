//! Business logic services.
//!
//! Services validate input and coordinate repositories. Each has its own
//! error enum which `AppError` converts into an HTTP response.

pub mod recipes;
pub mod shopping_list;
pub mod users;

pub use recipes::{RecipeError, RecipeForm, RecipePatchForm, RecipeService};
pub use shopping_list::{ShoppingListAggregator, ShoppingListStore};
pub use users::{RegistrationForm, UserError, UserService};
