//! Short recipe links (`/r/{id}`).

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use pantry_core::RecipeId;

use crate::db::RecipeRepository;
use crate::error::AppError;
use crate::extract::PathParam;
use crate::state::AppState;

/// Redirect (`302`) to the recipe's page on the web frontend.
#[instrument(skip(state))]
pub async fn redirect(
    State(state): State<AppState>,
    PathParam(id): PathParam<RecipeId>,
) -> Result<Response, AppError> {
    if RecipeRepository::new(state.pool())
        .summary(id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("recipe not found".to_owned()));
    }

    let location = state.config().recipe_url(id);
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
