//! End-to-end favorites flow through the HTTP router.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chronicle::{
    cache::TtlCache,
    config::{CacheSettings, Config, RetrySettings},
    model::app::AppState,
    router,
};
use chronicle_test_utils::{constant::TEST_JWT_SECRET, TestError, TestSetup};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        server_address: "127.0.0.1:0".to_string(),
        cache: CacheSettings {
            default_ttl: Duration::from_secs(60),
            favorites_ttl: Duration::from_secs(300),
            placeholder_ttl: Duration::from_secs(10),
            user_ttl: Duration::from_secs(1800),
            max_entries: 100,
            sweep_interval: Duration::from_secs(30),
        },
        retry: RetrySettings {
            max_retries: 2,
            base_delay: Duration::from_millis(10),
        },
        store_timeout: Duration::from_secs(3),
    }
}

async fn setup() -> Result<(TestSetup, AppState, Router), TestError> {
    let test = TestSetup::with_tables().await?;
    let config = Arc::new(test_config());
    let state = AppState::new(
        test.db.clone(),
        Arc::new(TtlCache::new(&config.cache)),
        config,
    );
    let router = router::routes().with_state(state.clone());

    Ok((test, state, router))
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Walks the full favorites lifecycle: empty view, idempotent add, removal,
/// and the empty view again once the cache was invalidated.
#[tokio::test]
async fn test_favorites_lifecycle() -> Result<(), TestError> {
    let (test, state, router) = setup().await?;
    let user = test.create_user("u1").await?;
    let token = test.mint_token(user.id, "u1")?;

    // No favorites yet: the empty view is served immediately
    let response = router
        .clone()
        .oneshot(authed_request("GET", "/api/favorites", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"events": [], "characters": [], "years": []})
    );

    // First add creates
    let response = router
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/favorites",
            &token,
            Some(json!({"kind": "event", "id": "e1"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "created"}));

    // Second add with the same body is an idempotent no-op
    let response = router
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/favorites",
            &token,
            Some(json!({"kind": "event", "id": "e1"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "already_favorited"})
    );

    let rows = test.favorites_for(user.id).await?;
    assert_eq!(rows.len(), 1);

    // Removal succeeds
    let response = router
        .clone()
        .oneshot(authed_request(
            "DELETE",
            "/api/favorites",
            &token,
            Some(json!({"kind": "event", "id": "e1"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "removed"}));

    // The mutation invalidated the cached view; the next read serves the
    // empty default again
    assert!(!state.cache.has(&TtlCache::favorites_key(user.id)));

    let response = router
        .oneshot(authed_request("GET", "/api/favorites", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"events": [], "characters": [], "years": []})
    );

    Ok(())
}

/// Expect requests without a bearer token to be rejected with 401
#[tokio::test]
async fn test_missing_token_unauthorized() -> Result<(), TestError> {
    let (_test, _state, router) = setup().await?;

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/favorites")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// Expect a garbage token to be rejected with 401
#[tokio::test]
async fn test_invalid_token_unauthorized() -> Result<(), TestError> {
    let (_test, _state, router) = setup().await?;

    let response = router
        .oneshot(authed_request("GET", "/api/favorites", "not-a-jwt", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// Expect an unknown kind to be rejected with 400 before any store call
#[tokio::test]
async fn test_invalid_kind_bad_request() -> Result<(), TestError> {
    let (test, _state, router) = setup().await?;
    let user = test.create_user("u2").await?;
    let token = test.mint_token(user.id, "u2")?;

    let response = router
        .oneshot(authed_request(
            "POST",
            "/api/favorites",
            &token,
            Some(json!({"kind": "planet", "id": "p1"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

/// Expect the profile endpoint to serve the token owner's profile
#[tokio::test]
async fn test_get_user_profile() -> Result<(), TestError> {
    let (test, _state, router) = setup().await?;
    let user = test.create_user("profiled").await?;
    let token = test.mint_token(user.id, "profiled")?;

    let response = router
        .oneshot(authed_request("GET", "/api/user", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], "profiled");
    assert_eq!(body["email"], "profiled@example.com");

    Ok(())
}
