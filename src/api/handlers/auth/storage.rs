//! Database helpers for users and the refresh-token blacklist.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub(crate) enum RegisterOutcome {
    Created,
    Conflict,
}

#[derive(Clone, Debug)]
pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

impl UserRecord {
    /// "First Last" with empty parts dropped, as shown in responses.
    pub(crate) fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
    }
}

pub(crate) async fn insert_user(
    pool: &PgPool,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<RegisterOutcome> {
    let query = r"
        INSERT INTO users (email, first_name, last_name)
        VALUES ($1, $2, $3)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .execute(pool)
        .instrument(span)
        .await;

    match result {
        Ok(_) => Ok(RegisterOutcome::Created),
        Err(err) if is_unique_violation(&err) => Ok(RegisterOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Look up a user by email, case-insensitively.
pub(crate) async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
    let query = r"
        SELECT id, email, first_name, last_name
        FROM users
        WHERE LOWER(email) = LOWER($1)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.as_ref().map(user_from_row))
}

/// Resolve the user for a verified email, creating the record lazily when it
/// does not exist yet. A concurrent insert losing the unique-index race falls
/// back to the existing row.
pub(crate) async fn get_or_create_user(pool: &PgPool, email: &str) -> Result<UserRecord> {
    if let Some(user) = find_user_by_email(pool, email).await? {
        return Ok(user);
    }

    let query = r"
        INSERT INTO users (email)
        VALUES ($1)
        RETURNING id, email, first_name, last_name
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let inserted = sqlx::query(query)
        .bind(email)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match inserted {
        Ok(row) => Ok(user_from_row(&row)),
        Err(err) if is_unique_violation(&err) => find_user_by_email(pool, email)
            .await?
            .context("user vanished after unique violation"),
        Err(err) => Err(err).context("failed to create user"),
    }
}

/// Record a refresh token's jti as permanently revoked.
///
/// Returns `false` when the jti was already blacklisted.
pub(crate) async fn blacklist_token(
    pool: &PgPool,
    jti: Uuid,
    user_id: Uuid,
    expires_at_unix: i64,
) -> Result<bool> {
    let expires_at: DateTime<Utc> = Utc
        .timestamp_opt(expires_at_unix, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let query = r"
        INSERT INTO blacklisted_tokens (jti, user_id, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (jti) DO NOTHING
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(jti)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to blacklist token")?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn is_token_blacklisted(pool: &PgPool, jti: Uuid) -> Result<bool> {
    let query = "SELECT 1 AS present FROM blacklisted_tokens WHERE jti = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(jti)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check token blacklist")?;

    Ok(row.is_some())
}
