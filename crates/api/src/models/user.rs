//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pantry_core::{Email, UserId, Username};

use super::RecipeSummary;

/// A registered user (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Public handle.
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a user profile.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
}

/// User as returned to clients, relative to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user. Always `false` for anonymous callers.
    pub is_subscribed: bool,
}

impl UserView {
    #[must_use]
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// A followed author with a preview of their latest recipes.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}
