//! Human hand-off tool.
//!
//! Declared on the classifier and on every stage handler. When the model
//! invokes it, the conversation is handed to a human operator: the notifier
//! delivers a report, the turn ends, and the user gets the hand-off message.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{EscalationNotifier, Tool, ToolContext, ToolError, ToolOutcome};

/// Message shown to the user when the conversation is handed off.
pub const HANDOFF_REPLY: &str =
    "I've passed your request to a manager. They will contact you here shortly.";

#[derive(Deserialize)]
struct EscalateArgs {
    reason: String,
}

/// Tool that hands the conversation to a human operator.
pub struct EscalateTool {
    notifier: Arc<dyn EscalationNotifier>,
}

impl EscalateTool {
    pub fn new(notifier: Arc<dyn EscalationNotifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Tool for EscalateTool {
    fn name(&self) -> &str {
        "call_manager"
    }

    fn description(&self) -> &str {
        "Hand the conversation to a human manager. Use when the client is \
         upset, demands a refund, asks something that needs a business \
         decision, or when another tool keeps failing. After calling this, \
         do not answer the client yourself."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "Short description of why a manager is needed"
                }
            },
            "required": ["reason"]
        })
    }

    async fn invoke(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutcome, ToolError> {
        let args: EscalateArgs = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let report = format!("Escalation from chat {}: {}", ctx.chat_id, args.reason);
        self.notifier
            .notify(&ctx.chat_id, &report)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        Ok(ToolOutcome::Escalation {
            user_message: HANDOFF_REPLY.to_string(),
            manager_alert: report,
        })
    }
}
