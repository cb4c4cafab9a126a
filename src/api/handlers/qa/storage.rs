//! Database helpers for questions, answers, and tags.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{AnswerDetail, QuestionAuthor, QuestionDetail, QuestionSummary};

fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}

/// Questions newest first, with author name, tag names, and answer count.
pub(crate) async fn list_questions(pool: &PgPool) -> Result<Vec<QuestionSummary>> {
    let query = r"
        SELECT q.id, q.title, q.content, q.created_at, q.updated_at, q.author_id,
               u.first_name, u.last_name,
               COALESCE(ARRAY_AGG(t.name ORDER BY t.name) FILTER (WHERE t.name IS NOT NULL), '{}') AS tags,
               (SELECT COUNT(*) FROM answers a WHERE a.question_id = q.id) AS answer_count
        FROM questions q
        JOIN users u ON u.id = q.author_id
        LEFT JOIN question_tags qt ON qt.question_id = q.id
        LEFT JOIN tags t ON t.id = qt.tag_id
        GROUP BY q.id, u.first_name, u.last_name
        ORDER BY q.created_at DESC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list questions")?;

    Ok(rows
        .into_iter()
        .map(|row| QuestionSummary {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            author: row.get("author_id"),
            tags: row.get("tags"),
            author_name: full_name(row.get("first_name"), row.get("last_name")),
            answer_count: row.get("answer_count"),
        })
        .collect())
}

/// Insert a question and attach its tags, creating missing tags on the fly.
pub(crate) async fn create_question(
    pool: &PgPool,
    author_id: Uuid,
    author_name: &str,
    title: &str,
    content: &str,
    tag_names: &[String],
) -> Result<QuestionSummary> {
    let mut tx = pool.begin().await.context("begin question transaction")?;

    let query = r"
        INSERT INTO questions (title, content, author_id)
        VALUES ($1, $2, $3)
        RETURNING id, created_at, updated_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(title)
        .bind(content)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await
        .context("failed to insert question")?;

    let question_id: i64 = row.get("id");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let mut tags = Vec::with_capacity(tag_names.len());
    for name in tag_names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        // Upsert so the RETURNING id works for both new and existing tags.
        let query = r"
            INSERT INTO tags (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let tag_row = sqlx::query(query)
            .bind(name)
            .fetch_one(&mut *tx)
            .instrument(span)
            .await
            .context("failed to upsert tag")?;
        let tag_id: i64 = tag_row.get("id");

        let query = r"
            INSERT INTO question_tags (question_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(question_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .instrument(span)
            .await
            .context("failed to attach tag")?;

        tags.push(name.to_string());
    }

    tx.commit().await.context("commit question transaction")?;

    Ok(QuestionSummary {
        id: question_id,
        title: title.to_string(),
        content: content.to_string(),
        created_at,
        updated_at,
        author: author_id,
        tags,
        author_name: author_name.to_string(),
        answer_count: 0,
    })
}

/// Full question with author, tags, and nested answers (newest first).
pub(crate) async fn get_question_detail(
    pool: &PgPool,
    question_id: i64,
) -> Result<Option<QuestionDetail>> {
    let query = r"
        SELECT q.id, q.title, q.content, q.created_at, q.updated_at,
               u.id AS author_id, u.email, u.first_name, u.last_name
        FROM questions q
        JOIN users u ON u.id = q.author_id
        WHERE q.id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(question_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch question")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let query = r"
        SELECT t.name
        FROM tags t
        JOIN question_tags qt ON qt.tag_id = t.id
        WHERE qt.question_id = $1
        ORDER BY t.name
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let tags = sqlx::query(query)
        .bind(question_id)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to fetch question tags")?
        .into_iter()
        .map(|tag_row| tag_row.get("name"))
        .collect();

    let query = r"
        SELECT a.id, a.content, a.created_at, a.updated_at,
               u.id AS author_id, u.email, u.first_name, u.last_name
        FROM answers a
        JOIN users u ON u.id = a.author_id
        WHERE a.question_id = $1
        ORDER BY a.created_at DESC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let answers = sqlx::query(query)
        .bind(question_id)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to fetch answers")?
        .into_iter()
        .map(|answer_row| AnswerDetail {
            id: answer_row.get("id"),
            content: answer_row.get("content"),
            author: QuestionAuthor {
                id: answer_row.get("author_id"),
                name: full_name(
                    answer_row.get("first_name"),
                    answer_row.get("last_name"),
                ),
                email: answer_row.get("email"),
            },
            created_at: answer_row.get("created_at"),
            updated_at: answer_row.get("updated_at"),
        })
        .collect();

    Ok(Some(QuestionDetail {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author: QuestionAuthor {
            id: row.get("author_id"),
            name: full_name(row.get("first_name"), row.get("last_name")),
            email: row.get("email"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        tags,
        answers,
    }))
}

pub(crate) enum CreateAnswerOutcome {
    Created {
        id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
    QuestionNotFound,
}

pub(crate) async fn create_answer(
    pool: &PgPool,
    question_id: i64,
    author_id: Uuid,
    content: &str,
) -> Result<CreateAnswerOutcome> {
    let query = r"
        INSERT INTO answers (question_id, content, author_id)
        SELECT $1, $2, $3
        WHERE EXISTS (SELECT 1 FROM questions WHERE id = $1)
        RETURNING id, created_at, updated_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(question_id)
        .bind(content)
        .bind(author_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to insert answer")?;

    Ok(row.map_or(CreateAnswerOutcome::QuestionNotFound, |row| {
        CreateAnswerOutcome::Created {
            id: row.get("id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_drops_empty_parts() {
        assert_eq!(full_name("Ada", "Lovelace"), "Ada Lovelace");
        assert_eq!(full_name("Ada", ""), "Ada");
        assert_eq!(full_name("", ""), "");
    }
}
