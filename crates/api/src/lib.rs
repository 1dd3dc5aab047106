//! Pantry API library.
//!
//! Recipe sharing backend: users publish recipes, keep favorites and a
//! shopping cart, follow authors, and download a merged shopping list.
//! Exposed as a library so the router can be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the application router with tracing and request IDs.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ApiConfig;

    /// Router over a pool that never connects; only paths that stop before
    /// touching the database are exercised here.
    fn test_app() -> Router {
        let config = ApiConfig::from_lookup(|key| match key {
            "PANTRY_DATABASE_URL" => Some("postgres://pantry@127.0.0.1:1/pantry".to_owned()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://pantry@127.0.0.1:1/pantry")
            .unwrap();
        app(AppState::new(config, pool))
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn error_message(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["error"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(request(Method::GET, "/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let response = test_app()
            .oneshot(request(Method::GET, "/health/ready"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let response = test_app()
            .oneshot(request(Method::GET, "/health"))
            .await
            .unwrap();

        let id = response.headers()[middleware::REQUEST_ID_HEADER]
            .to_str()
            .unwrap();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let req = Request::builder()
            .uri("/health")
            .header(middleware::REQUEST_ID_HEADER, "edge-1234")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(req).await.unwrap();

        assert_eq!(
            response.headers()[middleware::REQUEST_ID_HEADER],
            "edge-1234"
        );
    }

    #[tokio::test]
    async fn test_download_requires_identity() {
        let response = test_app()
            .oneshot(request(Method::GET, "/api/recipes/download_shopping_cart"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(response).await, "authentication required");
    }

    #[tokio::test]
    async fn test_protected_routes_reject_anonymous_callers() {
        let cases = [
            (Method::GET, "/api/users/me"),
            (Method::GET, "/api/users/subscriptions"),
            (Method::POST, "/api/users/2/subscribe"),
            (Method::DELETE, "/api/users/2/subscribe"),
            (Method::POST, "/api/recipes/1/favorite"),
            (Method::DELETE, "/api/recipes/1/shopping_cart"),
            (Method::DELETE, "/api/recipes/1"),
        ];

        for (method, uri) in cases {
            let response = test_app()
                .oneshot(request(method.clone(), uri))
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_identity_header_is_rejected() {
        let req = Request::builder()
            .uri("/api/recipes/download_shopping_cart")
            .header("x-user-id", "not-a-number")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(response).await, "malformed identity header");
    }

    #[tokio::test]
    async fn test_malformed_identity_rejected_on_public_routes() {
        let req = Request::builder()
            .uri("/api/recipes")
            .header("x-user-id", "-1")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_incomplete_body_is_bad_request() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/users")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"x"}"#))
            .unwrap();

        let response = test_app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(response).await.contains("email"));
    }

    #[tokio::test]
    async fn test_malformed_path_and_query_are_bad_requests() {
        for uri in ["/api/ingredients/abc", "/api/recipes?author=abc", "/r/-x"] {
            let response = test_app()
                .oneshot(request(Method::GET, uri))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert!(!error_message(response).await.is_empty(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = test_app()
            .oneshot(request(Method::GET, "/api/nothing-here"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
