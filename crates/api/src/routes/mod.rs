//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! # Users
//! POST   /api/users                          - Create profile
//! GET    /api/users                          - List users
//! GET    /api/users/me                       - Caller's profile (auth)
//! GET    /api/users/subscriptions            - Followed authors (auth)
//! GET    /api/users/{id}                     - One user
//! POST   /api/users/{id}/subscribe           - Follow author (auth)
//! DELETE /api/users/{id}/subscribe           - Unfollow author (auth)
//!
//! # Ingredients
//! GET    /api/ingredients?name=<prefix>      - Catalog search
//! GET    /api/ingredients/{id}               - One ingredient
//!
//! # Recipes
//! GET    /api/recipes                        - List, newest first
//! POST   /api/recipes                        - Publish (auth)
//! GET    /api/recipes/download_shopping_cart - Shopping list as text (auth)
//! GET    /api/recipes/{id}                   - One recipe
//! PATCH  /api/recipes/{id}                   - Edit (author)
//! DELETE /api/recipes/{id}                   - Delete (author)
//! POST   /api/recipes/{id}/favorite          - Add to favorites (auth)
//! DELETE /api/recipes/{id}/favorite          - Remove from favorites (auth)
//! POST   /api/recipes/{id}/shopping_cart     - Add to cart (auth)
//! DELETE /api/recipes/{id}/shopping_cart     - Remove from cart (auth)
//!
//! # Short links
//! GET    /r/{id}                             - Redirect to the recipe page
//! ```

pub mod ingredients;
pub mod recipes;
pub mod shopping_cart;
pub mod short_link;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/me", get(users::me))
        .route("/subscriptions", get(users::subscriptions))
        .route("/{id}", get(users::show))
        .route(
            "/{id}/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        )
}

/// Create the ingredient routes router.
pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ingredients::list))
        .route("/{id}", get(ingredients::show))
}

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::list).post(recipes::create))
        .route(
            "/download_shopping_cart",
            get(shopping_cart::download),
        )
        .route(
            "/{id}",
            get(recipes::show)
                .patch(recipes::update)
                .delete(recipes::delete),
        )
        .route(
            "/{id}/favorite",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            post(shopping_cart::add).delete(shopping_cart::remove),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/ingredients", ingredient_routes())
        .nest("/api/recipes", recipe_routes())
        .route("/r/{id}", get(short_link::redirect))
}
