//! Shopping cart handlers and the shopping list download.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use tracing::instrument;

use pantry_core::RecipeId;

use super::recipes::{add_to_list, remove_from_list};
use crate::db::{PgShoppingListStore, RecipeList};
use crate::error::AppError;
use crate::extract::PathParam;
use crate::middleware::RequireUser;
use crate::models::RecipeSummary;
use crate::services::ShoppingListAggregator;
use crate::state::AppState;

/// Offers the list to the browser as `shopping_list.txt`.
const DOWNLOAD_DISPOSITION: &str = r#"attachment; filename="shopping_list.txt""#;

/// Add a recipe to the caller's cart.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(id): PathParam<RecipeId>,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    add_to_list(&state, RecipeList::ShoppingCart, user.id, id).await
}

/// Remove a recipe from the caller's cart.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(id): PathParam<RecipeId>,
) -> Result<StatusCode, AppError> {
    remove_from_list(&state, RecipeList::ShoppingCart, user.id, id).await
}

/// Download the caller's aggregated shopping list as a text file.
///
/// An empty cart produces a document holding only the dated header.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn download(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Response, AppError> {
    let store = PgShoppingListStore::begin(state.pool()).await?;
    let aggregator = ShoppingListAggregator::new(store);

    let lines = aggregator.build_shopping_list(user.id).await?;
    aggregator.into_store().finish().await?;

    let body = ShoppingListAggregator::<PgShoppingListStore>::render_as_text(
        &lines,
        export_date(),
    );
    tracing::info!(lines = lines.len(), bytes = body.len(), "Shopping list exported");

    Ok(text_attachment(body))
}

/// Date printed on the list, in the server's local time zone.
fn export_date() -> NaiveDate {
    Local::now().date_naive()
}

fn text_attachment(body: Vec<u8>) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static(DOWNLOAD_DISPOSITION),
            ),
        ],
        body,
    )
        .into_response()
}
