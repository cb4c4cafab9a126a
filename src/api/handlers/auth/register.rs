//! User registration endpoint.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use tracing::error;

use super::storage::{insert_user, RegisterOutcome};
use super::types::RegisterRequest;
use super::utils::{normalize_email, valid_email};
use crate::api::handlers::detail;

#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = super::types::Detail),
        (status = 400, description = "Validation error or duplicate email", body = super::types::Detail)
    ),
    tag = "auth"
)]
pub async fn register(
    pool: Extension<PgPool>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return detail(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return detail(StatusCode::BAD_REQUEST, "Enter a valid email address.");
    }
    let first_name = request.first_name.trim();
    let last_name = request.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "This field may not be blank.");
    }

    match insert_user(&pool, &email, first_name, last_name).await {
        Ok(RegisterOutcome::Created) => detail(
            StatusCode::CREATED,
            "User registered successfully. Please verify OTP to login.",
        ),
        Ok(RegisterOutcome::Conflict) => {
            detail(StatusCode::BAD_REQUEST, "Email already registered.")
        }
        Err(err) => {
            error!("Failed to register user: {err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
        }
    }
}
