//! Per-chat mutual exclusion.
//!
//! A chat's turns must be strictly sequential: turn N+1 may not start until
//! turn N's session state is durably persisted (or its write has
//! definitively failed). The router holds a chat's lock for the whole pass
//! (load, classify, dispatch, persist), so two concurrent turns can never
//! race on the same continuation token.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Map of per-chat locks, created lazily.
#[derive(Default)]
pub struct ChatLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a chat, waiting if a turn is in flight.
    pub async fn acquire(&self, chat_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // An entry whose Arc the map holds alone has no turn in flight
            // and no waiter, so the map stays bounded by active chats.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(chat_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        // The map lock is released before waiting, so a long turn on one
        // chat never blocks other chats from acquiring theirs.
        lock.lock_owned().await
    }
}
