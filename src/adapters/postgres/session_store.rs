//! PostgreSQL implementation of [`SessionStore`].
//!
//! One row per chat in `chat_sessions`, keyed by `chat_id`. Writes are
//! idempotent upserts; reset is an upsert with NULLs so it is valid for
//! chats that have never been seen.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::warn;

use crate::domain::{SessionRecord, Stage};
use crate::ports::{SessionStore, SessionStoreError};

/// PostgreSQL-backed session store.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the session table if it does not exist.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_sessions (
                chat_id TEXT PRIMARY KEY,
                previous_response_id TEXT,
                last_stage TEXT,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn load(&self, chat_id: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        let row = sqlx::query(
            r#"
            SELECT chat_id, previous_response_id, last_stage, updated_at
            FROM chat_sessions
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|row| {
            let last_stage: Option<String> = row.get("last_stage");
            let last_stage = last_stage.and_then(|raw| match raw.parse::<Stage>() {
                Ok(stage) => Some(stage),
                Err(_) => {
                    // A stage removed from the vocabulary degrades to "no hint".
                    warn!(chat_id, stage = %raw, "stored stage is no longer in the vocabulary");
                    None
                }
            });
            let updated_at: DateTime<Utc> = row.get("updated_at");
            SessionRecord {
                chat_id: row.get("chat_id"),
                previous_response_id: row.get("previous_response_id"),
                last_stage,
                updated_at,
            }
        }))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
            INSERT INTO chat_sessions (chat_id, previous_response_id, last_stage, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (chat_id) DO UPDATE SET
                previous_response_id = EXCLUDED.previous_response_id,
                last_stage = EXCLUDED.last_stage,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.chat_id)
        .bind(&record.previous_response_id)
        .bind(record.last_stage.map(|s| s.as_str()))
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn reset(&self, chat_id: &str) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
            INSERT INTO chat_sessions (chat_id, previous_response_id, last_stage, updated_at)
            VALUES ($1, NULL, NULL, NOW())
            ON CONFLICT (chat_id) DO UPDATE SET
                previous_response_id = NULL,
                last_stage = NULL,
                updated_at = NOW()
            "#,
        )
        .bind(chat_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

fn db_error(err: sqlx::Error) -> SessionStoreError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            SessionStoreError::Unavailable(err.to_string())
        }
        _ => SessionStoreError::Database(err.to_string()),
    }
}
