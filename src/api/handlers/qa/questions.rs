//! Question list/create/detail endpoints.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::storage::{create_question, get_question_detail, list_questions};
use super::types::{CreateQuestionRequest, QuestionDetail, QuestionSummary};
use crate::api::handlers::auth::state::AuthState;
use crate::api::handlers::{detail, require_user};

#[utoipa::path(
    get,
    path = "/questions/",
    responses(
        (status = 200, description = "All questions, newest first", body = [QuestionSummary])
    ),
    tag = "questions"
)]
pub async fn questions_list(pool: Extension<PgPool>) -> impl IntoResponse {
    match list_questions(&pool).await {
        Ok(questions) => (StatusCode::OK, Json(questions)).into_response(),
        Err(err) => {
            error!("Failed to list questions: {err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list questions")
        }
    }
}

#[utoipa::path(
    post,
    path = "/questions/",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionSummary),
        (status = 400, description = "Validation error", body = crate::api::handlers::auth::types::Detail),
        (status = 401, description = "Missing or invalid access token", body = crate::api::handlers::auth::types::Detail)
    ),
    security(("bearer" = [])),
    tag = "questions"
)]
pub async fn questions_create(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CreateQuestionRequest>>,
) -> impl IntoResponse {
    let claims = match require_user(&headers, &auth_state) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let request: CreateQuestionRequest = match payload {
        Some(Json(payload)) => payload,
        None => return detail(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let title = request.title.trim();
    let content = request.content.trim();
    if title.is_empty() || content.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "This field may not be blank.");
    }

    let author_name = format!("{} {}", claims.first_name, claims.last_name)
        .trim()
        .to_string();
    match create_question(
        &pool,
        claims.sub,
        &author_name,
        title,
        content,
        &request.tag_names,
    )
    .await
    {
        Ok(question) => (StatusCode::CREATED, Json(question)).into_response(),
        Err(err) => {
            error!("Failed to create question: {err}");
            detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create question",
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/questions/{question_id}/",
    params(
        ("question_id" = i64, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question with nested answers", body = QuestionDetail),
        (status = 404, description = "Unknown question", body = crate::api::handlers::auth::types::Detail)
    ),
    tag = "questions"
)]
pub async fn question_detail(
    pool: Extension<PgPool>,
    Path(question_id): Path<i64>,
) -> impl IntoResponse {
    match get_question_detail(&pool, question_id).await {
        Ok(Some(question)) => (StatusCode::OK, Json(question)).into_response(),
        Ok(None) => detail(StatusCode::NOT_FOUND, "Not found."),
        Err(err) => {
            error!("Failed to fetch question {question_id}: {err}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch question")
        }
    }
}
