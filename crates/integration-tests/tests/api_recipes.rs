//! Integration tests for recipe publishing, favorites, and short links.
//!
//! Run with: `cargo test -p pantry-integration-tests -- --ignored`

use pantry_integration_tests::{PIXEL, TestContext};
use reqwest::StatusCode;
use serde_json::{Value, json};

// =============================================================================
// Publishing Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_and_show_recipe() {
    let ctx = TestContext::new();
    let author = ctx.create_user("chef").await;
    let ids = ctx.seed_ingredients(&[("egg", "pcs"), ("milk", "ml")]).await;

    let recipe = ctx
        .create_recipe(author, "Omelette", &[(ids[0], 3), (ids[1], 50)])
        .await;

    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/recipes/{recipe}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Omelette");
    assert_eq!(body["cooking_time"], 15);
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(body["ingredients"][0]["amount"], 3);
    assert_eq!(body["is_favorited"], false);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_recipe_rejects_invalid_input() {
    let ctx = TestContext::new();
    let author = ctx.create_user("chef").await;
    let ids = ctx.seed_ingredients(&[("flour", "g")]).await;

    let cases = [
        json!({ "name": "", "text": "x", "cooking_time": 5, "image": PIXEL,
                "ingredients": [{ "id": ids[0], "amount": 1 }] }),
        json!({ "name": "Zero", "text": "x", "cooking_time": 0, "image": PIXEL,
                "ingredients": [{ "id": ids[0], "amount": 1 }] }),
        json!({ "name": "Empty", "text": "x", "cooking_time": 5, "image": PIXEL,
                "ingredients": [] }),
        json!({ "name": "Dup", "text": "x", "cooking_time": 5, "image": PIXEL,
                "ingredients": [{ "id": ids[0], "amount": 1 }, { "id": ids[0], "amount": 2 }] }),
        json!({ "name": "NoAmount", "text": "x", "cooking_time": 5, "image": PIXEL,
                "ingredients": [{ "id": ids[0], "amount": 0 }] }),
        json!({ "name": "BadImage", "text": "x", "cooking_time": 5, "image": "not-an-image",
                "ingredients": [{ "id": ids[0], "amount": 1 }] }),
    ];

    for body in cases {
        let resp = ctx
            .as_user(ctx.client.post(ctx.url("/api/recipes")), author)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_only_author_may_edit_or_delete() {
    let ctx = TestContext::new();
    let author = ctx.create_user("chef").await;
    let other = ctx.create_user("critic").await;
    let ids = ctx.seed_ingredients(&[("tea", "g")]).await;
    let recipe = ctx.create_recipe(author, "Tea", &[(ids[0], 2)]).await;
    let path = format!("/api/recipes/{recipe}");

    let resp = ctx
        .as_user(ctx.client.patch(ctx.url(&path)), other)
        .json(&json!({ "name": "Coffee" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = ctx
        .as_user(ctx.client.delete(ctx.url(&path)), other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = ctx
        .as_user(ctx.client.patch(ctx.url(&path)), author)
        .json(&json!({ "name": "Green Tea" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Green Tea");
    assert_eq!(body["ingredients"][0]["amount"], 2);

    let resp = ctx
        .as_user(ctx.client.delete(ctx.url(&path)), author)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx.client.get(ctx.url(&path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Favorite Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_favorite_toggle_and_filter() {
    let ctx = TestContext::new();
    let author = ctx.create_user("chef").await;
    let fan = ctx.create_user("fan").await;
    let ids = ctx.seed_ingredients(&[("basil", "g")]).await;
    let recipe = ctx.create_recipe(author, "Pesto", &[(ids[0], 30)]).await;
    let path = format!("/api/recipes/{recipe}/favorite");

    let resp = ctx
        .as_user(ctx.client.post(ctx.url(&path)), fan)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], recipe);

    let resp = ctx
        .as_user(ctx.client.post(ctx.url(&path)), fan)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .as_user(ctx.client.get(ctx.url("/api/recipes?is_favorited=1")), fan)
        .send()
        .await
        .unwrap();
    let body: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["id"], recipe);
    assert_eq!(body[0]["is_favorited"], true);

    let resp = ctx
        .as_user(ctx.client.delete(ctx.url(&path)), fan)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .as_user(ctx.client.get(ctx.url("/api/recipes?is_favorited=1")), fan)
        .send()
        .await
        .unwrap();
    let body: Vec<Value> = resp.json().await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_list_by_author_is_newest_first() {
    let ctx = TestContext::new();
    let author = ctx.create_user("chef").await;
    let ids = ctx.seed_ingredients(&[("lemon", "pcs")]).await;
    let first = ctx.create_recipe(author, "Lemonade", &[(ids[0], 2)]).await;
    let second = ctx.create_recipe(author, "Lemon Tart", &[(ids[0], 3)]).await;

    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/recipes?author={author}")))
        .send()
        .await
        .unwrap();
    let body: Vec<Value> = resp.json().await.unwrap();
    let ids: Vec<i64> = body.iter().filter_map(|r| r["id"].as_i64()).collect();
    assert_eq!(ids, vec![second, first]);
}

// =============================================================================
// Short Link Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_short_link_redirects_to_recipe_page() {
    let ctx = TestContext::new();
    let author = ctx.create_user("chef").await;
    let ids = ctx.seed_ingredients(&[("mint", "g")]).await;
    let recipe = ctx.create_recipe(author, "Mojito", &[(ids[0], 10)]).await;

    let resp = ctx
        .client
        .get(ctx.url(&format!("/r/{recipe}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = resp.headers()["location"].to_str().unwrap();
    assert!(location.ends_with(&format!("/recipes/{recipe}")));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_short_link_unknown_recipe_is_not_found() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url(&format!("/r/{}", i32::MAX)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
