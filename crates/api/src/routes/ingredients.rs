//! Ingredient catalog handlers.

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use tracing::instrument;

use pantry_core::IngredientId;

use crate::db::IngredientRepository;
use crate::error::AppError;
use crate::extract::{PathParam, QueryParams};
use crate::models::Ingredient;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// Search the catalog.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IngredientQuery>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let ingredients = IngredientRepository::new(state.pool())
        .list(query.name.as_deref())
        .await?;
    Ok(Json(ingredients))
}

/// One catalog entry.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<IngredientId>,
) -> Result<Json<Ingredient>, AppError> {
    IngredientRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("ingredient not found".to_owned()))
}
