//! Integration tests for user profiles and subscriptions.
//!
//! Run with: `cargo test -p pantry-integration-tests -- --ignored`

use pantry_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn subscribe(ctx: &TestContext, user: i64, author: i64) -> reqwest::Response {
    ctx.as_user(
        ctx.client
            .post(ctx.url(&format!("/api/users/{author}/subscribe"))),
        user,
    )
    .send()
    .await
    .unwrap()
}

// =============================================================================
// Profile Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_user_and_fetch_me() {
    let ctx = TestContext::new();
    let id = ctx.create_user("alice").await;

    let resp = ctx
        .as_user(ctx.client.get(ctx.url("/api/users/me")), id)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], id);
    assert_eq!(body["username"], format!("alice_{}", ctx.tag));
    assert_eq!(body["is_subscribed"], false);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_username_is_rejected() {
    let ctx = TestContext::new();
    ctx.create_user("bob").await;

    let username = format!("bob_{}", ctx.tag);
    let resp = ctx
        .client
        .post(ctx.url("/api/users"))
        .json(&json!({
            "email": format!("other_{username}@example.com"),
            "username": username,
            "first_name": "Bob",
            "last_name": "Again",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("username"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_invalid_email_is_rejected() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.url("/api/users"))
        .json(&json!({
            "email": "not-an-email",
            "username": format!("carol_{}", ctx.tag),
            "first_name": "Carol",
            "last_name": "Tester",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_identity_is_unauthorized() {
    let ctx = TestContext::new();

    let resp = ctx
        .as_user(ctx.client.get(ctx.url("/api/users/me")), i64::from(i32::MAX))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Subscription Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_subscribe_is_idempotent() {
    let ctx = TestContext::new();
    let reader = ctx.create_user("reader").await;
    let author = ctx.create_user("author").await;

    let first = subscribe(&ctx, reader, author).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["is_subscribed"], true);

    assert_eq!(subscribe(&ctx, reader, author).await.status(), StatusCode::OK);

    let resp = ctx
        .as_user(
            ctx.client
                .get(ctx.url(&format!("/api/users/{author}"))),
            reader,
        )
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["is_subscribed"], true);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_self_subscription_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.create_user("narcissus").await;

    let resp = subscribe(&ctx, user, user).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_subscribe_to_unknown_author_is_not_found() {
    let ctx = TestContext::new();
    let user = ctx.create_user("seeker").await;

    let resp = subscribe(&ctx, user, i64::from(i32::MAX)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_subscriptions_preview_recipes() {
    let ctx = TestContext::new();
    let reader = ctx.create_user("reader").await;
    let author = ctx.create_user("author").await;
    let ids = ctx.seed_ingredients(&[("oats", "g")]).await;

    ctx.create_recipe(author, "Porridge", &[(ids[0], 80)]).await;
    ctx.create_recipe(author, "Granola", &[(ids[0], 200)]).await;
    subscribe(&ctx, reader, author).await;

    let resp = ctx
        .as_user(
            ctx.client
                .get(ctx.url("/api/users/subscriptions?recipes_limit=1")),
            reader,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Vec<Value> = resp.json().await.unwrap();
    let entry = body
        .iter()
        .find(|s| s["id"] == author)
        .expect("Followed author missing");
    assert_eq!(entry["recipes_count"], 2);
    assert_eq!(entry["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(entry["recipes"][0]["name"], "Granola");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unsubscribe_removes_author() {
    let ctx = TestContext::new();
    let reader = ctx.create_user("reader").await;
    let author = ctx.create_user("author").await;
    subscribe(&ctx, reader, author).await;

    let resp = ctx
        .as_user(
            ctx.client
                .delete(ctx.url(&format!("/api/users/{author}/subscribe"))),
            reader,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .as_user(ctx.client.get(ctx.url("/api/users/subscriptions")), reader)
        .send()
        .await
        .unwrap();
    let body: Vec<Value> = resp.json().await.unwrap();
    assert!(body.iter().all(|s| s["id"] != author));
}
