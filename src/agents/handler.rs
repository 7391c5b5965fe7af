//! Stage handlers: one per stage, each wrapping an agent with a fixed
//! instruction set, a fixed tool set, and a fallback reply.
//!
//! A handler never fails a turn. Remote failure, timeout, or empty model
//! output all collapse into the fallback reply with no token progression, so
//! continuation state is never corrupted by a bad turn.

use std::sync::Arc;

use tracing::error;

use crate::domain::Stage;
use crate::ports::{CompletionClient, Tool};

use super::agent::{Agent, Escalation};
use super::tools::{CatalogTool, EscalateTool, ServiceCatalog};
use crate::ports::EscalationNotifier;

/// Reply used when the remote service fails or produces nothing usable.
pub const FALLBACK_REPLY: &str =
    "Sorry, something went wrong on our side. Please try again in a minute.";

/// Result of one handler execution. Always a well-formed reply.
#[derive(Debug, Clone)]
pub struct HandlerOutcome {
    pub reply: String,
    /// New continuation token; `None` means the turn must not progress the
    /// stored token (failure path).
    pub new_response_id: Option<String>,
    /// Diagnostic handler name.
    pub handled_by: String,
    pub used_tools: Vec<String>,
    pub escalation: Option<Escalation>,
}

/// A stage-specific response handler.
pub struct StageHandler {
    stage: Stage,
    agent: Agent,
}

impl StageHandler {
    pub fn new(stage: Stage, agent: Agent) -> Self {
        Self { stage, agent }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    /// Execute one turn. Failures are absorbed into the fallback reply with
    /// `new_response_id: None`.
    pub async fn handle(
        &self,
        message: &str,
        previous_response_id: Option<&str>,
        chat_id: &str,
    ) -> HandlerOutcome {
        match self.agent.run_turn(message, previous_response_id, chat_id).await {
            Ok(reply) => HandlerOutcome {
                reply: reply.reply,
                new_response_id: reply.response_id,
                handled_by: self.agent.name().to_string(),
                used_tools: reply.used_tools,
                escalation: reply.escalation,
            },
            Err(err) => {
                error!(
                    chat_id,
                    stage = %self.stage,
                    handler = self.agent.name(),
                    %err,
                    "handler turn failed, using fallback reply"
                );
                HandlerOutcome {
                    reply: FALLBACK_REPLY.to_string(),
                    new_response_id: None,
                    handled_by: self.agent.name().to_string(),
                    used_tools: Vec::new(),
                    escalation: None,
                }
            }
        }
    }
}

/// Everything a handler factory needs: the shared client and the
/// dependencies of the declared tools.
pub struct HandlerDeps {
    pub client: Arc<dyn CompletionClient>,
    pub notifier: Arc<dyn EscalationNotifier>,
    pub catalog: Arc<ServiceCatalog>,
}

/// Construct the handler for a stage. Exhaustive over the vocabulary:
/// adding a stage without a handler is a compile error.
pub fn build_handler(stage: Stage, deps: &HandlerDeps) -> StageHandler {
    let escalate: Arc<dyn Tool> = Arc::new(EscalateTool::new(deps.notifier.clone()));
    let catalog: Arc<dyn Tool> = Arc::new(CatalogTool::new(deps.catalog.clone()));

    let (name, instructions, tools): (&str, &str, Vec<Arc<dyn Tool>>) = match stage {
        Stage::Greeting => (
            "greeting_handler",
            "You are the salon's front-desk assistant. Greet the client warmly, \
             introduce yourself once, and ask how you can help. Keep it short.",
            vec![escalate],
        ),
        Stage::InformationGathering => (
            "information_handler",
            "Answer questions about services, prices, durations and staff. \
             Use the get_services tool for anything catalog-related; never invent \
             prices.",
            vec![escalate, catalog],
        ),
        Stage::Booking => (
            "booking_handler",
            "Help the client book a service. Collect the service, the preferred \
             date and time, and the client's name. Confirm the details back \
             before finishing. Use get_services to check what is offered.",
            vec![escalate, catalog],
        ),
        Stage::BookingToMaster => (
            "booking_to_master_handler",
            "Help the client book with a specific specialist. Confirm which \
             specialist they want, then the service and time.",
            vec![escalate, catalog],
        ),
        Stage::CancellationRequest => (
            "cancellation_handler",
            "Help the client cancel an existing booking. Confirm which booking \
             before cancelling, and be understanding.",
            vec![escalate],
        ),
        Stage::Reschedule => (
            "reschedule_handler",
            "Help the client move an existing booking to another time. Confirm \
             the current booking first, then the new time.",
            vec![escalate],
        ),
        Stage::ViewMyBooking => (
            "view_my_booking_handler",
            "Show the client their upcoming bookings and answer questions about \
             them.",
            vec![escalate],
        ),
    };

    StageHandler::new(stage, Agent::new(name, instructions, tools, deps.client.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockCompletionClient;
    use crate::adapters::escalation::RecordingEscalationNotifier;
    use crate::ports::{CompletionError, ResponseOutput};

    fn deps(client: Arc<MockCompletionClient>) -> HandlerDeps {
        HandlerDeps {
            client,
            notifier: Arc::new(RecordingEscalationNotifier::new()),
            catalog: Arc::new(ServiceCatalog::default()),
        }
    }

    #[tokio::test]
    async fn every_stage_has_a_handler_with_a_distinct_name() {
        let client = Arc::new(MockCompletionClient::new());
        let deps = deps(client);

        let mut names: Vec<String> = Stage::ALL
            .iter()
            .map(|stage| build_handler(*stage, &deps).name().to_string())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Stage::ALL.len());
    }

    #[tokio::test]
    async fn successful_turn_passes_through_reply_and_token() {
        let client = Arc::new(MockCompletionClient::new());
        client.push_output(ResponseOutput::text("R1", "Welcome")).await;
        let handler = build_handler(Stage::Greeting, &deps(client));

        let outcome = handler.handle("hello", None, "chat-1").await;

        assert_eq!(outcome.reply, "Welcome");
        assert_eq!(outcome.new_response_id.as_deref(), Some("R1"));
        assert_eq!(outcome.handled_by, "greeting_handler");
    }

    #[tokio::test]
    async fn timeout_yields_fallback_without_token_progression() {
        let client = Arc::new(MockCompletionClient::new());
        client
            .push_error(CompletionError::Timeout { timeout_secs: 30 })
            .await;
        let handler = build_handler(Stage::Greeting, &deps(client));

        let outcome = handler.handle("hello", Some("R0"), "chat-1").await;

        assert_eq!(outcome.reply, FALLBACK_REPLY);
        assert_eq!(outcome.new_response_id, None);
    }

    #[tokio::test]
    async fn empty_model_output_yields_fallback() {
        let client = Arc::new(MockCompletionClient::new());
        client
            .push_output(ResponseOutput {
                response_id: "R1".into(),
                output_text: None,
                tool_calls: vec![],
            })
            .await;
        let handler = build_handler(Stage::ViewMyBooking, &deps(client));

        let outcome = handler.handle("my bookings", None, "chat-1").await;

        assert_eq!(outcome.reply, FALLBACK_REPLY);
        assert_eq!(outcome.new_response_id, None);
    }
}
