//! Recipe handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use pantry_core::{RecipeId, UserId};

use crate::db::{RecipeList, RecipeListRepository, RecipeRepository};
use crate::error::AppError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::{Recipe, RecipeFilter, RecipeSummary};
use crate::services::{RecipeForm, RecipePatchForm, RecipeService};
use crate::state::AppState;

/// Query parameters for `GET /api/recipes`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub author: Option<UserId>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeListQuery {
    fn filter(&self) -> RecipeFilter {
        RecipeFilter {
            author: self.author,
            favorited_only: is_truthy(self.is_favorited.as_deref()),
            in_cart_only: is_truthy(self.is_in_shopping_cart.as_deref()),
        }
    }
}

fn is_truthy(flag: Option<&str>) -> bool {
    matches!(flag, Some("1" | "true" | "True"))
}

/// List recipes newest first.
#[instrument(skip(state, viewer))]
pub async fn list(
    State(state): State<AppState>,
    viewer: OptionalUser,
    QueryParams(query): QueryParams<RecipeListQuery>,
) -> Result<Json<Vec<Recipe>>, AppError> {
    let recipes = RecipeRepository::new(state.pool())
        .list(viewer.id(), query.filter())
        .await?;
    Ok(Json(recipes))
}

/// One recipe.
#[instrument(skip(state, viewer))]
pub async fn show(
    State(state): State<AppState>,
    viewer: OptionalUser,
    PathParam(id): PathParam<RecipeId>,
) -> Result<Json<Recipe>, AppError> {
    RecipeRepository::new(state.pool())
        .get(id, viewer.id())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("recipe not found".to_owned()))
}

/// Publish a recipe authored by the caller.
#[instrument(skip(state, user, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    JsonBody(form): JsonBody<RecipeForm>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let recipe = RecipeService::new(state.pool()).create(user.id, form).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Partially update a recipe. Author only.
#[instrument(skip(state, user, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(id): PathParam<RecipeId>,
    JsonBody(form): JsonBody<RecipePatchForm>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = RecipeService::new(state.pool())
        .update(user.id, id, form)
        .await?;
    Ok(Json(recipe))
}

/// Delete a recipe. Author only.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(id): PathParam<RecipeId>,
) -> Result<StatusCode, AppError> {
    RecipeService::new(state.pool()).delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the caller's favorites.
#[instrument(skip(state, user))]
pub async fn add_favorite(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(id): PathParam<RecipeId>,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    add_to_list(&state, RecipeList::Favorites, user.id, id).await
}

/// Remove a recipe from the caller's favorites.
#[instrument(skip(state, user))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(id): PathParam<RecipeId>,
) -> Result<StatusCode, AppError> {
    remove_from_list(&state, RecipeList::Favorites, user.id, id).await
}

// =============================================================================
// Membership Helpers
// =============================================================================

/// Insert-if-absent. `201` for a new entry, `200` if it was already there.
pub(crate) async fn add_to_list(
    state: &AppState,
    list: RecipeList,
    user: UserId,
    recipe: RecipeId,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    let summary = RecipeRepository::new(state.pool())
        .summary(recipe)
        .await?
        .ok_or_else(|| AppError::NotFound("recipe not found".to_owned()))?;

    let created = RecipeListRepository::new(state.pool(), list)
        .add(user, recipe)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(summary)))
}

/// Delete-if-present. Always `204` for an existing recipe.
pub(crate) async fn remove_from_list(
    state: &AppState,
    list: RecipeList,
    user: UserId,
    recipe: RecipeId,
) -> Result<StatusCode, AppError> {
    if RecipeRepository::new(state.pool())
        .summary(recipe)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("recipe not found".to_owned()));
    }

    let removed = RecipeListRepository::new(state.pool(), list)
        .remove(user, recipe)
        .await?;
    tracing::debug!(?list, removed, "Recipe list entry removed");

    Ok(StatusCode::NO_CONTENT)
}
