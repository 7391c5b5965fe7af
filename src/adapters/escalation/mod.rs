//! Escalation notifier adapters.
//!
//! Production wiring uses the tracing notifier: hand-offs land in the log
//! stream operators already watch. The recording notifier is for tests.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::ports::{EscalationError, EscalationNotifier};

/// Notifier that reports escalations through the log stream.
#[derive(Debug, Default)]
pub struct TracingEscalationNotifier;

impl TracingEscalationNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EscalationNotifier for TracingEscalationNotifier {
    async fn notify(&self, chat_id: &str, report: &str) -> Result<(), EscalationError> {
        warn!(chat_id, report, "conversation escalated to a human");
        Ok(())
    }
}

/// In-memory notifier that records every hand-off; can be made to fail.
#[derive(Default)]
pub struct RecordingEscalationNotifier {
    notifications: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingEscalationNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose deliveries always fail.
    pub fn failing() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// `(chat_id, report)` pairs delivered so far.
    pub async fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().await.clone()
    }
}

#[async_trait]
impl EscalationNotifier for RecordingEscalationNotifier {
    async fn notify(&self, chat_id: &str, report: &str) -> Result<(), EscalationError> {
        if self.fail {
            return Err(EscalationError("delivery channel unavailable".into()));
        }
        self.notifications
            .lock()
            .await
            .push((chat_id.to_string(), report.to_string()));
        Ok(())
    }
}
