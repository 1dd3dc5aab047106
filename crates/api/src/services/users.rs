//! User profiles and subscriptions.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use pantry_core::{Email, EmailError, UserId, Username, UsernameError};

use crate::db::{FollowRepository, RecipeRepository, RepositoryError, UserRepository};
use crate::models::{NewUser, Subscription, User, UserView};

/// Longest accepted first or last name, in characters.
pub const MAX_PERSONAL_NAME_LENGTH: usize = 150;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Invalid email format.
    #[error("email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid username.
    #[error("username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// First or last name failed validation.
    #[error("{0}")]
    InvalidName(String),

    /// Users cannot follow themselves.
    #[error("you cannot subscribe to yourself")]
    SelfSubscription,

    /// Target user does not exist.
    #[error("user not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegistrationForm {
    /// Validate every field without touching the database.
    ///
    /// # Errors
    ///
    /// Returns the first failing field's `UserError`.
    pub fn validate(self) -> Result<NewUser, UserError> {
        Ok(NewUser {
            email: Email::parse(&self.email)?,
            username: Username::parse(&self.username)?,
            first_name: validate_personal_name("first_name", &self.first_name)?,
            last_name: validate_personal_name("last_name", &self.last_name)?,
        })
    }
}

fn validate_personal_name(field: &str, value: &str) -> Result<String, UserError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UserError::InvalidName(format!("{field}: must not be empty")));
    }
    if value.chars().count() > MAX_PERSONAL_NAME_LENGTH {
        return Err(UserError::InvalidName(format!(
            "{field}: must be at most {MAX_PERSONAL_NAME_LENGTH} characters"
        )));
    }
    Ok(value.to_owned())
}

/// Profile and subscription operations.
pub struct UserService<'a> {
    pool: &'a PgPool,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user profile.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for bad input, or
    /// `UserError::Repository(Conflict)` when the email or username is taken.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, form: RegistrationForm) -> Result<User, UserError> {
        let new_user = form.validate()?;
        let user = UserRepository::new(self.pool).create(&new_user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Follow `author`. Returns the author's view and whether the follow is new.
    ///
    /// # Errors
    ///
    /// Returns `UserError::SelfSubscription` when `user == author`.
    /// Returns `UserError::NotFound` if the author does not exist.
    /// Returns `UserError::Repository` if the database fails.
    #[tracing::instrument(skip_all, fields(user_id = %user, author_id = %author))]
    pub async fn subscribe(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<(UserView, bool), UserError> {
        if user == author {
            return Err(UserError::SelfSubscription);
        }

        let users = UserRepository::new(self.pool);
        if users.get_by_id(author).await?.is_none() {
            return Err(UserError::NotFound);
        }

        let created = FollowRepository::new(self.pool).follow(user, author).await?;
        let view = users
            .get_view(author, Some(user))
            .await?
            .ok_or(UserError::NotFound)?;

        Ok((view, created))
    }

    /// Stop following `author`. Succeeds whether or not a follow existed.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the author does not exist.
    /// Returns `UserError::Repository` if the database fails.
    #[tracing::instrument(skip_all, fields(user_id = %user, author_id = %author))]
    pub async fn unsubscribe(&self, user: UserId, author: UserId) -> Result<(), UserError> {
        if UserRepository::new(self.pool)
            .get_by_id(author)
            .await?
            .is_none()
        {
            return Err(UserError::NotFound);
        }

        let removed = FollowRepository::new(self.pool).unfollow(user, author).await?;
        tracing::debug!(removed, "Unsubscribed");
        Ok(())
    }

    /// Authors `user` follows, each with up to `recipes_limit` latest recipes.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` if the database fails.
    pub async fn subscriptions(
        &self,
        user: UserId,
        recipes_limit: Option<i64>,
    ) -> Result<Vec<Subscription>, UserError> {
        let followed = FollowRepository::new(self.pool).followed_authors(user).await?;

        let author_ids: Vec<UserId> = followed.iter().map(|(author, _)| author.id).collect();
        let mut recipes = RecipeRepository::new(self.pool)
            .latest_by_authors(&author_ids, recipes_limit)
            .await?;

        Ok(followed
            .into_iter()
            .map(|(author, recipes_count)| Subscription {
                recipes: recipes.remove(&author.id).unwrap_or_default(),
                author,
                recipes_count,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            email: "Cook@Example.com".to_owned(),
            username: "chef.anna".to_owned(),
            first_name: " Anna ".to_owned(),
            last_name: "Smith".to_owned(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let user = form().validate().unwrap();
        assert_eq!(user.email.as_str(), "Cook@example.com");
        assert_eq!(user.username.as_str(), "chef.anna");
        assert_eq!(user.first_name, "Anna");
    }

    #[test]
    fn test_reserved_username_rejected() {
        let mut f = form();
        f.username = "me".to_owned();
        assert!(matches!(
            f.validate(),
            Err(UserError::InvalidUsername(UsernameError::Reserved(_)))
        ));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut f = form();
        f.email = "not-an-email".to_owned();
        let err = f.validate().unwrap_err();
        assert!(err.to_string().starts_with("email:"));
    }

    #[test]
    fn test_blank_last_name_rejected() {
        let mut f = form();
        f.last_name = String::new();
        let err = f.validate().unwrap_err();
        assert_eq!(err.to_string(), "last_name: must not be empty");
    }
}
