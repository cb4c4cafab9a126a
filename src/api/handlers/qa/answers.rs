//! Answer creation endpoint.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::storage::{create_answer, CreateAnswerOutcome};
use super::types::{AnswerOut, CreateAnswerRequest};
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::{detail, require_user};

#[utoipa::path(
    post,
    path = "/answers/",
    request_body = CreateAnswerRequest,
    responses(
        (status = 201, description = "Answer created", body = AnswerOut),
        (status = 400, description = "Validation error or unknown question", body = crate::api::handlers::auth::types::Detail),
        (status = 401, description = "Missing or invalid access token", body = crate::api::handlers::auth::types::Detail)
    ),
    security(("bearer" = [])),
    tag = "answers"
)]
pub async fn answers_create(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CreateAnswerRequest>>,
) -> impl IntoResponse {
    let claims = match require_user(&headers, &auth_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let request: CreateAnswerRequest = match payload {
        Some(Json(payload)) => payload,
        None => return detail(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let content = request.content.trim();
    if content.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "This field may not be blank.");
    }

    match create_answer(&pool, request.question, claims.sub, content).await {
        Ok(CreateAnswerOutcome::Created {
            id,
            created_at,
            updated_at,
        }) => {
            let author_name = format!("{} {}", claims.first_name, claims.last_name)
                .trim()
                .to_string();
            let response = AnswerOut {
                id,
                content: content.to_string(),
                created_at,
                updated_at,
                author: claims.sub,
                question: request.question,
                author_name,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Ok(CreateAnswerOutcome::QuestionNotFound) => detail(
            StatusCode::BAD_REQUEST,
            "Invalid pk - object does not exist.",
        ),
        Err(err) => {
            error!("Failed to create answer: {err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create answer")
        }
    }
}
