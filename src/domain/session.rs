//! Durable per-chat session state.
//!
//! One record per chat: the remote service's continuation token and the last
//! stage the conversation was known to be in. The token is opaque; it is
//! stored and forwarded verbatim, never parsed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stage::Stage;

/// Durable session record, keyed by `chat_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque conversation identifier, stable across turns.
    pub chat_id: String,
    /// Continuation token from the last remote-service turn.
    pub previous_response_id: Option<String>,
    /// Last stage the conversation resolved to (diagnostic / default hint).
    pub last_stage: Option<Stage>,
    /// When this record was last written.
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// A fresh record for a chat with no prior history.
    pub fn empty(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            previous_response_id: None,
            last_stage: None,
            updated_at: Utc::now(),
        }
    }

    /// Record a completed turn: the new continuation token replaces the old
    /// one and the resolved stage becomes the default hint.
    pub fn record_turn(&mut self, response_id: impl Into<String>, stage: Stage) {
        self.previous_response_id = Some(response_id.into());
        self.last_stage = Some(stage);
        self.updated_at = Utc::now();
    }

    /// Clear continuation state. The record itself survives; memory reset is
    /// the only teardown path a conversation ever sees.
    pub fn reset(&mut self) {
        self.previous_response_id = None;
        self.last_stage = None;
        self.updated_at = Utc::now();
    }

    /// True if this chat has no continuation token.
    pub fn is_fresh(&self) -> bool {
        self.previous_response_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_fresh() {
        let record = SessionRecord::empty("chat-1");
        assert!(record.is_fresh());
        assert_eq!(record.last_stage, None);
    }

    #[test]
    fn record_turn_replaces_token_and_stage() {
        let mut record = SessionRecord::empty("chat-1");
        record.record_turn("R1", Stage::Greeting);
        record.record_turn("R2", Stage::ViewMyBooking);

        assert_eq!(record.previous_response_id.as_deref(), Some("R2"));
        assert_eq!(record.last_stage, Some(Stage::ViewMyBooking));
    }

    #[test]
    fn reset_clears_token_and_stage_but_keeps_chat_id() {
        let mut record = SessionRecord::empty("chat-1");
        record.record_turn("R1", Stage::Greeting);
        record.reset();

        assert_eq!(record.chat_id, "chat-1");
        assert!(record.is_fresh());
        assert_eq!(record.last_stage, None);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut record = SessionRecord::empty("chat-1");
        record.record_turn("R1", Stage::Greeting);
        record.reset();
        let after_first = record.clone();
        record.reset();

        assert_eq!(record.previous_response_id, after_first.previous_response_id);
        assert_eq!(record.last_stage, after_first.last_stage);
    }
}
