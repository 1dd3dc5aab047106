//! Integration tests for Pantry.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the API
//! cargo run -p pantry-cli -- migrate
//! cargo run -p pantry-api
//!
//! # Run the ignored black-box tests
//! cargo test -p pantry-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `PANTRY_TEST_BASE_URL` - API under test (default: <http://localhost:8000>)
//! - `PANTRY_DATABASE_URL` - Same database the API uses; seeds the ingredient catalog
//!
//! Every helper creates uniquely named users and ingredients, so tests can
//! share one database and run in parallel.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::indexing_slicing)]

use pantry_api::db::{IngredientRepository, create_pool};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;

/// 1x1 transparent PNG as a data URI.
pub const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Identity header the API trusts by default.
pub const IDENTITY_HEADER: &str = "x-user-id";

/// Base URL of the API under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("PANTRY_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Shared HTTP client and helpers for one test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    /// Random suffix keeping this test's rows apart from others.
    pub tag: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url(),
            tag: Uuid::new_v4().simple().to_string()[..12].to_string(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Request builder carrying `user_id` as the caller's identity.
    #[must_use]
    pub fn as_user(&self, builder: RequestBuilder, user_id: i64) -> RequestBuilder {
        builder.header(IDENTITY_HEADER, user_id.to_string())
    }

    /// Create a user and return its ID.
    pub async fn create_user(&self, name: &str) -> i64 {
        let username = format!("{name}_{}", self.tag);
        let resp = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({
                "email": format!("{username}@example.com"),
                "username": username,
                "first_name": name,
                "last_name": "Tester",
            }))
            .send()
            .await
            .expect("Failed to create user");

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Insert catalog ingredients directly and return their IDs, in order.
    ///
    /// Names get this test's tag appended so they never collide.
    pub async fn seed_ingredients(&self, entries: &[(&str, &str)]) -> Vec<i64> {
        let database_url = std::env::var("PANTRY_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("PANTRY_DATABASE_URL must be set for integration tests");
        let pool = create_pool(&SecretString::from(database_url), 1)
            .await
            .expect("Failed to connect to database");

        let tagged: Vec<(String, String)> = entries
            .iter()
            .map(|(name, unit)| (self.tagged(name), (*unit).to_string()))
            .collect();
        IngredientRepository::new(&pool)
            .bulk_insert(&tagged)
            .await
            .expect("Failed to seed ingredients");

        let mut ids = Vec::with_capacity(tagged.len());
        for (name, unit) in &tagged {
            let search =
                Url::parse_with_params(&self.url("/api/ingredients"), &[("name", name)]).unwrap();
            let resp = self
                .client
                .get(search)
                .send()
                .await
                .unwrap();
            let found: Vec<Value> = resp.json().await.unwrap();
            let id = found
                .iter()
                .find(|i| i["name"] == name.as_str() && i["measurement_unit"] == unit.as_str())
                .and_then(|i| i["id"].as_i64())
                .expect("Seeded ingredient not found");
            ids.push(id);
        }
        ids
    }

    /// Publish a recipe as `author` and return its ID.
    pub async fn create_recipe(&self, author: i64, name: &str, lines: &[(i64, i64)]) -> i64 {
        let ingredients: Vec<Value> = lines
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect();

        let resp = self
            .as_user(self.client.post(self.url("/api/recipes")), author)
            .json(&json!({
                "name": name,
                "text": "Combine everything.",
                "cooking_time": 15,
                "image": PIXEL,
                "ingredients": ingredients,
            }))
            .send()
            .await
            .expect("Failed to create recipe");

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// Name with this test's tag appended.
    #[must_use]
    pub fn tagged(&self, name: &str) -> String {
        format!("{name} {}", self.tag)
    }
}
