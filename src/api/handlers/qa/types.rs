//! Request/response types for the question/answer endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub content: String,
    pub tag_names: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct QuestionSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Uuid,
    pub tags: Vec<String>,
    pub author_name: String,
    pub answer_count: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct QuestionAuthor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AnswerDetail {
    pub id: i64,
    pub content: String,
    pub author: QuestionAuthor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct QuestionDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: QuestionAuthor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub answers: Vec<AnswerDetail>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CreateAnswerRequest {
    pub question: i64,
    pub content: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AnswerOut {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Uuid,
    pub question: i64,
    pub author_name: String,
}
