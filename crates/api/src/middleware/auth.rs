//! Identity extractors.
//!
//! Authentication happens upstream. The auth proxy forwards the caller's
//! user ID in a configurable header (`x-user-id` by default); these
//! extractors trust that header and load the matching profile.
//!
//! A header that is present but malformed, or names an unknown user, is
//! rejected with `401` even where identity is optional.

use axum::{extract::FromRequestParts, http::request::Parts};

use pantry_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireUser(user): RequireUser) -> Json<UserView> {
///     Json(UserView::new(user, false))
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
    }
}

/// Extractor that optionally gets the caller.
///
/// Unlike `RequireUser`, anonymous requests are accepted and yield `None`.
pub struct OptionalUser(pub Option<User>);

impl OptionalUser {
    /// The caller's ID, if any.
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).await.map(Self)
    }
}

/// Parse the identity header value into a user ID.
fn parse_identity(raw: &[u8]) -> Option<UserId> {
    std::str::from_utf8(raw)
        .ok()?
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .map(UserId::new)
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(raw) = parts.headers.get(&state.config().identity_header) else {
        return Ok(None);
    };

    let id = parse_identity(raw.as_bytes())
        .ok_or_else(|| AppError::Unauthorized("malformed identity header".to_owned()))?;

    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = %id, "Identity header names an unknown user");
            AppError::Unauthorized("unknown user".to_owned())
        })?;

    set_sentry_user(user.id.as_i32(), user.username.as_str());
    Ok(Some(user))
}
