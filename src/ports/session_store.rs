//! Session store port.
//!
//! Durable mapping from `chat_id` to [`SessionRecord`]. Backed by a
//! key-value table that survives process restarts; the in-memory adapter is
//! a degraded fallback for tests and local development.

use async_trait::async_trait;

use crate::domain::SessionRecord;

/// Port for durable per-chat session persistence.
///
/// Implementations must support idempotent upsert and point lookup by
/// `chat_id`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for a chat. `Ok(None)` means no prior session.
    async fn load(&self, chat_id: &str) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Upsert the session record.
    async fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError>;

    /// Clear continuation token and stage hint for a chat. Idempotent, and
    /// valid for chats that have never been seen.
    async fn reset(&self, chat_id: &str) -> Result<(), SessionStoreError>;
}

/// Session store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionStoreError {
    /// Query or write failed.
    #[error("database error: {0}")]
    Database(String),

    /// Backend cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
