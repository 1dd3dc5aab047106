//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PANTRY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `PANTRY_HOST` - Bind address (default: 127.0.0.1)
//! - `PANTRY_PORT` - Listen port (default: 8000)
//! - `PANTRY_BASE_URL` - Public URL of the web frontend, used by short links
//!   (default: <http://localhost:8000>)
//! - `PANTRY_IDENTITY_HEADER` - Header carrying the authenticated user ID set by
//!   the upstream auth proxy (default: x-user-id)
//! - `PANTRY_DB_MAX_CONNECTIONS` - Connection pool size (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderName;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the web frontend
    pub base_url: Url,
    /// Header the auth proxy uses to forward the caller's user ID
    pub identity_header: HeaderName,
    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("PANTRY_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("PANTRY_DATABASE_URL".to_string()))?;

        let host = parse_var(&lookup, "PANTRY_HOST", "127.0.0.1", |v| {
            v.parse::<IpAddr>().map_err(|e| e.to_string())
        })?;
        let port = parse_var(&lookup, "PANTRY_PORT", "8000", |v| {
            v.parse::<u16>().map_err(|e| e.to_string())
        })?;
        let base_url = parse_var(&lookup, "PANTRY_BASE_URL", "http://localhost:8000", |v| {
            let url = Url::parse(v).map_err(|e| e.to_string())?;
            if url.host_str().is_none() {
                return Err("base URL must have a host".to_string());
            }
            Ok(url)
        })?;
        let identity_header = parse_var(&lookup, "PANTRY_IDENTITY_HEADER", "x-user-id", |v| {
            HeaderName::try_from(v).map_err(|e| e.to_string())
        })?;
        let db_max_connections = parse_var(&lookup, "PANTRY_DB_MAX_CONNECTIONS", "10", |v| {
            match v.parse::<u32>() {
                Ok(0) => Err("must be greater than zero".to_string()),
                Ok(n) => Ok(n),
                Err(e) => Err(e.to_string()),
            }
        })?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            identity_header,
            db_max_connections,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Public frontend URL of a recipe page.
    #[must_use]
    pub fn recipe_url(&self, recipe_id: pantry_core::RecipeId) -> String {
        format!(
            "{}/recipes/{recipe_id}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read a variable (or its default) and parse it, tagging errors with the key.
fn parse_var<F, T, P>(lookup: &F, key: &str, default: &str, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: FnOnce(&str) -> Result<T, String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}
