//! Access-token refresh endpoint.
//!
//! A refresh token that has been blacklisted by logout never mints another
//! access token, which is what makes revocation observable to clients.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::state::AuthState;
use super::storage::is_token_blacklisted;
use super::types::{TokenRefreshRequest, TokenRefreshResponse};
use crate::api::handlers::detail;

#[utoipa::path(
    post,
    path = "/token/refresh/",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenRefreshResponse),
        (status = 401, description = "Invalid, expired, or revoked refresh token", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn token_refresh(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<TokenRefreshRequest>>,
) -> impl IntoResponse {
    let request: TokenRefreshRequest = match payload {
        Some(Json(payload)) => payload,
        None => return detail(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let claims = match auth_state.tokens().decode_refresh(&request.refresh) {
        Ok(claims) => claims,
        Err(err) => return detail(StatusCode::UNAUTHORIZED, err.to_string()),
    };

    // Revoked is terminal: the signature may still be valid but the jti is
    // burned.
    match is_token_blacklisted(&pool, claims.jti).await {
        Ok(false) => {}
        Ok(true) => return detail(StatusCode::UNAUTHORIZED, "Token is blacklisted"),
        Err(err) => {
            error!("Failed to check token blacklist: {err}");
            return detail(StatusCode::INTERNAL_SERVER_ERROR, "Token refresh failed");
        }
    }

    match auth_state.tokens().access_from_refresh(&claims) {
        Ok(access) => (StatusCode::OK, Json(TokenRefreshResponse { access })).into_response(),
        Err(err) => {
            error!("Failed to derive access token: {err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Token refresh failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{auth_state, lazy_pool};
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn refresh_missing_payload() {
        let response = token_refresh(Extension(lazy_pool()), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refresh_rejects_garbage_token() {
        let response = token_refresh(
            Extension(lazy_pool()),
            Extension(auth_state()),
            Some(Json(TokenRefreshRequest {
                refresh: "not-a-token".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
