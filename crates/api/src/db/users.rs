//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pantry_core::{Email, UserId, Username};

use super::{RepositoryError, map_constraint_error};
use crate::models::{NewUser, User, UserView};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` account queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserRow {
    pub(super) id: i32,
    pub(super) email: String,
    pub(super) username: String,
    pub(super) first_name: String,
    pub(super) last_name: String,
    pub(super) created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            username,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
        })
    }
}

/// Account row plus the viewer's follow flag.
#[derive(Debug, sqlx::FromRow)]
struct UserViewRow {
    #[sqlx(flatten)]
    user: UserRow,
    is_subscribed: bool,
}

impl TryFrom<UserViewRow> for UserView {
    type Error = RepositoryError;

    fn try_from(row: UserViewRow) -> Result<Self, Self::Error> {
        Ok(Self::new(row.user.try_into()?, row.is_subscribed))
    }
}

const CONSTRAINT_MESSAGES: &[(&str, &str)] = &[
    ("account_email_unique", "a user with this email already exists"),
    ("account_username_unique", "a user with this username already exists"),
];

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO pantry.account (email, username, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, username, first_name, last_name, created_at
            ",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint_error(e, CONSTRAINT_MESSAGES))?;

        row.try_into()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored profile is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, username, first_name, last_name, created_at
            FROM pantry.account
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored profile is invalid.
    pub async fn get_view(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> Result<Option<UserView>, RepositoryError> {
        let row = sqlx::query_as::<_, UserViewRow>(
            r"
            SELECT a.id, a.email, a.username, a.first_name, a.last_name, a.created_at,
                   EXISTS (
                       SELECT 1 FROM pantry.follow f
                       WHERE f.user_id = $2 AND f.author_id = a.id
                   ) AS is_subscribed
            FROM pantry.account a
            WHERE a.id = $1
            ",
        )
        .bind(id)
        .bind(viewer)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all users ordered by username, as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored profile is invalid.
    pub async fn list(&self, viewer: Option<UserId>) -> Result<Vec<UserView>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserViewRow>(
            r"
            SELECT a.id, a.email, a.username, a.first_name, a.last_name, a.created_at,
                   EXISTS (
                       SELECT 1 FROM pantry.follow f
                       WHERE f.user_id = $1 AND f.author_id = a.id
                   ) AS is_subscribed
            FROM pantry.account a
            ORDER BY a.username
            ",
        )
        .bind(viewer)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
