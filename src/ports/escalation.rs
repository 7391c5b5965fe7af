//! Escalation notifier port: how a human hand-off reaches an operator.

use async_trait::async_trait;

/// Port for notifying a human operator about an escalated conversation.
#[async_trait]
pub trait EscalationNotifier: Send + Sync {
    /// Deliver an escalation report for a chat.
    async fn notify(&self, chat_id: &str, report: &str) -> Result<(), EscalationError>;
}

/// Escalation delivery errors.
#[derive(Debug, Clone, thiserror::Error)]
#[error("escalation delivery failed: {0}")]
pub struct EscalationError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn EscalationNotifier) {}
    }
}
