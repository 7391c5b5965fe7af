//! Stage classifier: decides which dialogue stage a conversation is in.
//!
//! Classification is itself a completion call, constrained to emit exactly
//! one token from the closed stage vocabulary. Raw output is validated
//! against the vocabulary before anything is returned; values outside it are
//! coerced to `Ambiguous`. A failed call is also `Ambiguous` (recovered
//! locally by the router's policy), never a turn-level failure.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{parse_stage_output, Stage, StageDecision};
use crate::ports::{CompletionClient, Tool};

use super::agent::{Agent, Escalation};

/// Outcome of one classification call.
#[derive(Debug, Clone)]
pub struct Classification {
    pub decision: ClassifierDecision,
    /// Continuation token advanced by the classification call itself. Must
    /// be threaded to the handler so classifier-visible context is not
    /// re-explained.
    pub response_id: Option<String>,
}

/// What the classification call decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierDecision {
    /// A concrete stage from the closed vocabulary.
    Stage(Stage),
    /// The output could not be mapped; the router resolves this per its
    /// ambiguity policy.
    Ambiguous,
    /// A hand-off was requested mid-classification; the turn ends here.
    Escalate(Escalation),
}

/// Classification agent over the closed stage vocabulary.
pub struct StageDetector {
    agent: Agent,
}

impl StageDetector {
    /// Build the detector. `tools` normally carries the escalation tool so
    /// an explicit hand-off request is caught before dispatch.
    pub fn new(client: Arc<dyn CompletionClient>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            agent: Agent::new("stage_detector", detector_instructions(), tools, client),
        }
    }

    /// Classify a message given the chat's current continuation token.
    pub async fn classify(
        &self,
        message: &str,
        previous_response_id: Option<&str>,
        chat_id: &str,
    ) -> Classification {
        let reply = match self.agent.run_turn(message, previous_response_id, chat_id).await {
            Ok(reply) => reply,
            Err(err) => {
                // Classification failure: fall through to the ambiguity
                // policy without advancing the token.
                warn!(chat_id, %err, "stage classification call failed");
                return Classification {
                    decision: ClassifierDecision::Ambiguous,
                    response_id: None,
                };
            }
        };

        if let Some(escalation) = reply.escalation {
            debug!(chat_id, "escalation requested during classification");
            return Classification {
                decision: ClassifierDecision::Escalate(escalation),
                response_id: reply.response_id,
            };
        }

        let decision = match parse_stage_output(&reply.reply) {
            StageDecision::Stage(stage) => ClassifierDecision::Stage(stage),
            StageDecision::Ambiguous => {
                warn!(chat_id, raw = %reply.reply, "classifier output outside the stage vocabulary");
                ClassifierDecision::Ambiguous
            }
        };

        Classification {
            decision,
            response_id: reply.response_id,
        }
    }
}

/// The classifier prompt is generated from the vocabulary so the list of
/// stages can never drift from the enum.
fn detector_instructions() -> String {
    let mut out = String::from(
        "You classify the client's message into exactly one dialogue stage.\n\nSTAGES:\n",
    );
    for stage in Stage::ALL {
        out.push_str(&format!("- {}: {}\n", stage.as_str(), stage.description()));
    }
    out.push_str("\nAnswer with ONLY one word: the stage name.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockCompletionClient;
    use crate::ports::{CompletionError, ResponseOutput, ToolContext, ToolError, ToolOutcome};
    use async_trait::async_trait;

    #[tokio::test]
    async fn instructions_list_every_stage() {
        let text = detector_instructions();
        for stage in Stage::ALL {
            assert!(text.contains(stage.as_str()), "missing {stage}");
        }
    }

    #[tokio::test]
    async fn concrete_stage_is_returned_with_advanced_token() {
        let client = Arc::new(MockCompletionClient::new());
        client.push_output(ResponseOutput::text("R1", "greeting")).await;

        let detector = StageDetector::new(client, vec![]);
        let classification = detector.classify("hello", None, "chat-1").await;

        assert_eq!(classification.decision, ClassifierDecision::Stage(Stage::Greeting));
        assert_eq!(classification.response_id.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn out_of_vocabulary_output_is_coerced_to_ambiguous() {
        let client = Arc::new(MockCompletionClient::new());
        client.push_output(ResponseOutput::text("R1", "checkout")).await;

        let detector = StageDetector::new(client, vec![]);
        let classification = detector.classify("pay please", None, "chat-1").await;

        assert_eq!(classification.decision, ClassifierDecision::Ambiguous);
        // The call still advanced the token; it must not be discarded.
        assert_eq!(classification.response_id.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn failed_call_is_ambiguous_without_token_advance() {
        let client = Arc::new(MockCompletionClient::new());
        client
            .push_error(CompletionError::Unavailable { message: "down".into() })
            .await;

        let detector = StageDetector::new(client, vec![]);
        let classification = detector.classify("hello", Some("R0"), "chat-1").await;

        assert_eq!(classification.decision, ClassifierDecision::Ambiguous);
        assert_eq!(classification.response_id, None);
    }

    struct HandOff;

    #[async_trait]
    impl Tool for HandOff {
        fn name(&self) -> &str {
            "call_manager"
        }

        fn description(&self) -> &str {
            "hand the conversation to a human"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object", "properties": {} })
        }

        async fn invoke(
            &self,
            _args: serde_json::Value,
            _ctx: &ToolContext,
        ) -> Result<ToolOutcome, ToolError> {
            Ok(ToolOutcome::Escalation {
                user_message: "A manager will contact you".into(),
                manager_alert: "client asked for a human".into(),
            })
        }
    }

    #[tokio::test]
    async fn hand_off_tool_yields_escalate() {
        let client = Arc::new(MockCompletionClient::new());
        client
            .push_output(ResponseOutput::tool_call("R1", "call-1", "call_manager", "{}"))
            .await;

        let detector = StageDetector::new(client, vec![Arc::new(HandOff)]);
        let classification = detector.classify("get me a human", None, "chat-1").await;

        match classification.decision {
            ClassifierDecision::Escalate(escalation) => {
                assert_eq!(escalation.user_message, "A manager will contact you");
            }
            other => panic!("expected escalation, got {other:?}"),
        }
    }
}
