//! Database-backed flow tests: full OTP login, token revocation, and the
//! logout/refresh interplay. Each test gets its own migrated database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use qanda::api::email::LogEmailSender;
use qanda::api::handlers::auth::{AuthConfig, AuthState};
use qanda::api::router;
use qanda::otp::{otp_key, MemoryOtpStore, OtpStore};
use qanda::tokens::TokenManager;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

fn test_router(pool: PgPool, store: Arc<MemoryOtpStore>) -> axum::Router {
    let auth_state = Arc::new(AuthState::new(
        AuthConfig::new(
            "no-reply@qanda.dev".to_string(),
            "http://localhost:3000".to_string(),
        ),
        TokenManager::new(&SecretString::from("test-secret")),
        store,
        Arc::new(LogEmailSender),
    ));
    router(pool, auth_state)
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn json_post_bearer(uri: &str, access: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Register, request a code, and verify it, returning `(refresh, access)`.
async fn login(app: &axum::Router, store: &MemoryOtpStore, email: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(json_post(
            "/register/",
            &format!(r#"{{"first_name": "Ada", "last_name": "Lovelace", "email": "{email}"}}"#),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_post("/send-otp/", &format!(r#"{{"email": "{email}"}}"#)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let code = store.get(&otp_key(email)).expect("issued code");

    let response = app
        .clone()
        .oneshot(json_post(
            "/verify-otp/",
            &format!(r#"{{"email": "{email}", "otp": "{code}"}}"#),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let refresh = body["refresh"].as_str().expect("refresh").to_string();
    let access = body["access"].as_str().expect("access").to_string();
    (refresh, access)
}

#[sqlx::test]
async fn verify_flow_returns_tokens_and_consumes_code(pool: PgPool) {
    let store = Arc::new(MemoryOtpStore::new());
    let app = test_router(pool, Arc::clone(&store));

    let response = app
        .clone()
        .oneshot(json_post(
            "/register/",
            r#"{"first_name": "Ada", "last_name": "Lovelace", "email": "ada@x.com"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_post("/send-otp/", r#"{"email": "ada@x.com"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let code = store.get(&otp_key("ada@x.com")).expect("issued code");
    let verify_body = format!(r#"{{"email": "ada@x.com", "otp": "{code}"}}"#);

    let response = app
        .clone()
        .oneshot(json_post("/verify-otp/", &verify_body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Logged in as ada@x.com");
    assert!(body["refresh"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["access"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "ada@x.com");
    assert_eq!(body["user"]["name"], "Ada Lovelace");

    // The code is consumed: gone from the cache, and a replay fails.
    assert!(store.get(&otp_key("ada@x.com")).is_none());
    let response = app
        .oneshot(json_post("/verify-otp/", &verify_body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Invalid or expired OTP.");
}

#[sqlx::test]
async fn revoked_refresh_token_cannot_mint_access(pool: PgPool) {
    let store = Arc::new(MemoryOtpStore::new());
    let app = test_router(pool, Arc::clone(&store));
    let (refresh, access) = login(&app, &store, "ada@x.com").await;
    let refresh_body = format!(r#"{{"refresh": "{refresh}"}}"#);

    // Live refresh token mints an access token.
    let response = app
        .clone()
        .oneshot(json_post("/token/refresh/", &refresh_body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["access"]
        .as_str()
        .is_some_and(|t| !t.is_empty()));

    let response = app
        .clone()
        .oneshot(json_post_bearer("/logout/", &access, &refresh_body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // Revoked is terminal even though the signature is still valid.
    let response = app
        .oneshot(json_post("/token/refresh/", &refresh_body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "Token is blacklisted");
}

#[sqlx::test]
async fn second_logout_of_same_token_is_rejected(pool: PgPool) {
    let store = Arc::new(MemoryOtpStore::new());
    let app = test_router(pool, Arc::clone(&store));
    let (refresh, access) = login(&app, &store, "ada@x.com").await;
    let refresh_body = format!(r#"{{"refresh": "{refresh}"}}"#);

    let response = app
        .clone()
        .oneshot(json_post_bearer("/logout/", &access, &refresh_body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_post_bearer("/logout/", &access, &refresh_body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Token is blacklisted");
}

#[sqlx::test]
async fn concurrent_logouts_of_same_token_have_one_winner(pool: PgPool) {
    let store = Arc::new(MemoryOtpStore::new());
    let app = test_router(pool, Arc::clone(&store));
    let (refresh, access) = login(&app, &store, "ada@x.com").await;
    let refresh_body = format!(r#"{{"refresh": "{refresh}"}}"#);

    let (first, second) = tokio::join!(
        app.clone()
            .oneshot(json_post_bearer("/logout/", &access, &refresh_body)),
        app.clone()
            .oneshot(json_post_bearer("/logout/", &access, &refresh_body)),
    );
    let statuses = [
        first.expect("response").status(),
        second.expect("response").status(),
    ];

    // The jti lands in the blacklist exactly once; the other request must
    // observe the revocation, never a second success.
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::OK).count(),
        1,
        "statuses: {statuses:?}"
    );
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::BAD_REQUEST)
            .count(),
        1,
        "statuses: {statuses:?}"
    );
}
