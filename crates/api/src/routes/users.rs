//! User profile and subscription handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use pantry_core::UserId;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::{Subscription, UserView};
use crate::services::{RegistrationForm, UserService};
use crate::state::AppState;

/// Query parameters for `GET /api/users/subscriptions`.
#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    /// Maximum number of recipes previewed per author.
    pub recipes_limit: Option<i64>,
}

/// Create a user profile.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<RegistrationForm>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let user = UserService::new(state.pool()).register(form).await?;
    Ok((StatusCode::CREATED, Json(UserView::new(user, false))))
}

/// List all users ordered by username.
#[instrument(skip(state, viewer))]
pub async fn list(
    State(state): State<AppState>,
    viewer: OptionalUser,
) -> Result<Json<Vec<UserView>>, AppError> {
    let users = UserRepository::new(state.pool()).list(viewer.id()).await?;
    Ok(Json(users))
}

/// The caller's own profile.
#[instrument(skip(user))]
pub async fn me(RequireUser(user): RequireUser) -> Json<UserView> {
    Json(UserView::new(user, false))
}

/// One user profile.
#[instrument(skip(state, viewer))]
pub async fn show(
    State(state): State<AppState>,
    viewer: OptionalUser,
    PathParam(id): PathParam<UserId>,
) -> Result<Json<UserView>, AppError> {
    UserRepository::new(state.pool())
        .get_view(id, viewer.id())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))
}

/// Follow an author.
///
/// Responds `201` when the follow is new and `200` when it already existed.
#[instrument(skip(state, user))]
pub async fn subscribe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(author): PathParam<UserId>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let (view, created) = UserService::new(state.pool())
        .subscribe(user.id, author)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(view)))
}

/// Stop following an author.
#[instrument(skip(state, user))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(author): PathParam<UserId>,
) -> Result<StatusCode, AppError> {
    UserService::new(state.pool())
        .unsubscribe(user.id, author)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Authors the caller follows.
#[instrument(skip(state, user))]
pub async fn subscriptions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    QueryParams(query): QueryParams<SubscriptionsQuery>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    if query.recipes_limit.is_some_and(|limit| limit < 0) {
        return Err(AppError::BadRequest(
            "recipes_limit: must not be negative".to_owned(),
        ));
    }

    let subscriptions = UserService::new(state.pool())
        .subscriptions(user.id, query.recipes_limit)
        .await?;
    Ok(Json(subscriptions))
}
