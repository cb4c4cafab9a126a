//! Request handlers and the helpers they share.

pub mod auth;
pub mod health;
pub mod qa;

pub use self::health::health;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use self::auth::state::AuthState;
use self::auth::types::Detail;
use crate::tokens::Claims;

/// Build a `{"detail": "..."}` response with the given status.
pub(crate) fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Detail::new(message))).into_response()
}

/// Pull the token out of an `Authorization: Bearer ...` header.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Authenticate a request from its access token, statelessly.
///
/// Access tokens are verified by signature and expiry only; the blacklist
/// applies to refresh tokens.
pub(crate) fn require_user(headers: &HeaderMap, state: &AuthState) -> Result<Claims, Response> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(detail(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        ));
    };
    state
        .tokens()
        .decode_access(&token)
        .map_err(|err| detail(StatusCode::UNAUTHORIZED, err.to_string()))
}

/// Plain-text landing route.
pub async fn root() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}
