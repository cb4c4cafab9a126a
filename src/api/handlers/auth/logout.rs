//! Logout endpoint: blacklists the presented refresh token.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::state::AuthState;
use super::storage::blacklist_token;
use super::types::LogoutRequest;
use crate::api::handlers::{detail, require_user};

#[utoipa::path(
    post,
    path = "/logout/",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = super::types::Detail),
        (status = 400, description = "Invalid or already revoked refresh token", body = super::types::Detail),
        (status = 401, description = "Missing or invalid access token", body = super::types::Detail)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LogoutRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_user(&headers, &auth_state) {
        return response;
    }

    let request: LogoutRequest = match payload {
        Some(Json(payload)) => payload,
        None => return detail(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    // Malformed or expired refresh tokens report an error instead of
    // silently succeeding.
    let claims = match auth_state.tokens().decode_refresh(&request.refresh) {
        Ok(claims) => claims,
        Err(err) => return detail(StatusCode::BAD_REQUEST, err.to_string()),
    };

    // The insert is the arbiter: with two concurrent logouts carrying the
    // same jti, exactly one row lands and the loser sees zero rows affected.
    match blacklist_token(&pool, claims.jti, claims.sub, claims.exp).await {
        Ok(true) => detail(StatusCode::OK, "Logged out successfully"),
        Ok(false) => detail(StatusCode::BAD_REQUEST, "Token is blacklisted"),
        Err(err) => {
            error!("Failed to blacklist token: {err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Logout failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{auth_state, lazy_pool};
    use super::*;
    use crate::tokens::Identity;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;
    use uuid::Uuid;

    fn bearer_headers(access: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access}")).expect("header"),
        );
        headers
    }

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn logout_requires_access_token() {
        let response = logout(
            HeaderMap::new(),
            Extension(lazy_pool()),
            Extension(auth_state()),
            None,
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_rejects_malformed_refresh_token() {
        let state = auth_state();
        let pair = state.tokens().issue_pair(&identity()).expect("issue pair");
        let response = logout(
            bearer_headers(&pair.access),
            Extension(lazy_pool()),
            Extension(state),
            Some(Json(LogoutRequest {
                refresh: "not-a-token".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_rejects_access_token_in_refresh_slot() {
        let state = auth_state();
        let pair = state.tokens().issue_pair(&identity()).expect("issue pair");
        let response = logout(
            bearer_headers(&pair.access),
            Extension(lazy_pool()),
            Extension(state),
            Some(Json(LogoutRequest {
                refresh: pair.access.clone(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
