//! In-memory session store.
//!
//! Degraded fallback and test double for the Postgres store. Supports
//! injecting save failures so persistence-retry behavior is testable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::SessionRecord;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory [`SessionStore`].
#[derive(Default)]
pub struct InMemorySessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
    failing_saves: AtomicUsize,
    save_attempts: AtomicUsize,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` save attempts fail.
    pub fn fail_next_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    /// Total save attempts, including failed ones.
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, chat_id: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self.records.read().await.get(chat_id).cloned())
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_saves.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_saves.store(failing - 1, Ordering::SeqCst);
            return Err(SessionStoreError::Unavailable("injected save failure".into()));
        }
        self.records
            .write()
            .await
            .insert(record.chat_id.clone(), record.clone());
        Ok(())
    }

    async fn reset(&self, chat_id: &str) -> Result<(), SessionStoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(chat_id.to_string())
            .or_insert_with(|| SessionRecord::empty(chat_id));
        record.reset();
        Ok(())
    }
}
