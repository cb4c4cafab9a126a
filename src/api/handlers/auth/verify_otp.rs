//! OTP verification endpoint: single-use code check and token issuance.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::state::AuthState;
use super::storage::get_or_create_user;
use super::types::{UserProfile, VerifyOtpRequest, VerifyOtpResponse};
use super::utils::normalize_email;
use crate::api::handlers::detail;
use crate::otp::otp_key;
use crate::tokens::Identity;

#[utoipa::path(
    post,
    path = "/verify-otp/",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Authenticated", body = VerifyOtpResponse),
        (status = 400, description = "Invalid or expired OTP", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return detail(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    if request.otp.len() != 6 {
        return detail(
            StatusCode::BAD_REQUEST,
            "OTP must be exactly 6 characters.",
        );
    }

    let email = normalize_email(&request.email);

    // Compare-and-delete under one lock: a mismatch, a missing entry, and an
    // expired entry all land in the same branch, and two concurrent attempts
    // with the correct code can only see one winner.
    if !auth_state
        .otp_store()
        .take_matching(&otp_key(&email), &request.otp)
    {
        return detail(StatusCode::BAD_REQUEST, "Invalid or expired OTP.");
    }

    let user = match get_or_create_user(&pool, &email).await {
        Ok(user) => user,
        Err(err) => {
            error!("Failed to resolve user after OTP match: {err}");
            return detail(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    };
    let pair = match auth_state.tokens().issue_pair(&identity) {
        Ok(pair) => pair,
        Err(err) => {
            error!("Failed to issue token pair: {err}");
            return detail(StatusCode::INTERNAL_SERVER_ERROR, "Login failed");
        }
    };

    let response = VerifyOtpResponse {
        detail: format!("Logged in as {email}"),
        refresh: pair.refresh,
        access: pair.access,
        user: UserProfile {
            email: user.email.clone(),
            username: user.email.clone(),
            name: user.full_name(),
            first_name: user.first_name,
            last_name: user.last_name,
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}
