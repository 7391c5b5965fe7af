//! Base agent: one fixed instruction set, one fixed tool set, one shared
//! completion client.
//!
//! An agent drives a single conversational turn against the remote service.
//! When the service reports tool invocations, the agent executes the
//! declared tools locally and relays their textual results back with the
//! advanced continuation token, looping until the service produces text.
//! The loop is bounded; tool errors become text results for the model, never
//! user-visible exceptions.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::ports::{
    declaration, CompletionClient, CompletionError, InputItem, ResponseRequest, Tool, ToolContext,
    ToolOutcome,
};

/// Upper bound on completion calls within one turn. The service may chain
/// several tool rounds; past this the turn is considered stuck.
const MAX_TOOL_ITERATIONS: usize = 10;

/// An LLM-backed agent with fixed instructions and declared tools.
pub struct Agent {
    name: String,
    instructions: String,
    tools: HashMap<String, Arc<dyn Tool>>,
    client: Arc<dyn CompletionClient>,
}

/// The final result of one agent turn.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Text for the user.
    pub reply: String,
    /// New continuation token for the next turn, forwarded verbatim.
    pub response_id: Option<String>,
    /// Names of tools executed during the turn (diagnostic).
    pub used_tools: Vec<String>,
    /// Set when a tool handed the conversation to a human.
    pub escalation: Option<Escalation>,
}

/// A human hand-off produced by a tool mid-turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    /// What the user is told.
    pub user_message: String,
    /// What the operator receives.
    pub manager_alert: String,
}

/// Agent turn errors. The stage handler translates these into its fallback
/// reply; they never reach the chat transport.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The service returned neither text nor tool calls.
    #[error("empty output from completion service")]
    EmptyOutput,

    /// Tool rounds exceeded the per-turn bound.
    #[error("tool loop exceeded {limit} iterations")]
    ToolLoopExceeded { limit: usize },
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        tools: Vec<Arc<dyn Tool>>,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        let tools = tools
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run one full turn: message in, reply and new continuation token out.
    ///
    /// `previous_response_id` anchors the service's memory of prior turns
    /// and is threaded forward as each response advances it.
    pub async fn run_turn(
        &self,
        message: &str,
        previous_response_id: Option<&str>,
        chat_id: &str,
    ) -> Result<AgentReply, AgentError> {
        let declarations: Vec<_> = self.tools.values().map(|t| declaration(t.as_ref())).collect();
        let ctx = ToolContext {
            chat_id: chat_id.to_string(),
        };

        let mut current_token: Option<String> = previous_response_id.map(str::to_string);
        let mut input = vec![InputItem::UserMessage {
            content: message.to_string(),
        }];
        let mut used_tools = Vec::new();

        for iteration in 1..=MAX_TOOL_ITERATIONS {
            debug!(
                agent = %self.name,
                chat_id,
                iteration,
                has_token = current_token.is_some(),
                "completion call"
            );

            let request = ResponseRequest {
                instructions: self.instructions.clone(),
                input: std::mem::take(&mut input),
                tools: declarations.clone(),
                previous_response_id: current_token.clone(),
            };
            let response = self.client.create_response(request).await?;
            current_token = Some(response.response_id.clone());

            if let Some(text) = response.output_text.filter(|t| !t.trim().is_empty()) {
                return Ok(AgentReply {
                    reply: text,
                    response_id: current_token,
                    used_tools,
                    escalation: None,
                });
            }

            if response.tool_calls.is_empty() {
                return Err(AgentError::EmptyOutput);
            }

            for call in response.tool_calls {
                used_tools.push(call.name.clone());
                let output = match self.execute_tool(&call.name, &call.arguments, &ctx).await {
                    ToolRound::Text(text) => text,
                    ToolRound::Escalation(escalation) => {
                        return Ok(AgentReply {
                            reply: escalation.user_message.clone(),
                            response_id: current_token,
                            used_tools,
                            escalation: Some(escalation),
                        });
                    }
                };
                input.push(InputItem::ToolOutput {
                    call_id: call.call_id,
                    output,
                });
            }
        }

        Err(AgentError::ToolLoopExceeded {
            limit: MAX_TOOL_ITERATIONS,
        })
    }

    /// Execute a declared tool. All failure shapes collapse into a text
    /// result fed back to the model.
    async fn execute_tool(&self, name: &str, arguments: &str, ctx: &ToolContext) -> ToolRound {
        let Some(tool) = self.tools.get(name) else {
            warn!(agent = %self.name, tool = name, "model invoked an undeclared tool");
            return ToolRound::Text(format!("unknown tool: {name}"));
        };

        let args: serde_json::Value = match serde_json::from_str(arguments) {
            Ok(value) => value,
            Err(err) => {
                warn!(agent = %self.name, tool = name, %err, "unparseable tool arguments");
                serde_json::Value::Object(Default::default())
            }
        };

        match tool.invoke(args, ctx).await {
            Ok(ToolOutcome::Text(text)) => ToolRound::Text(text),
            Ok(ToolOutcome::Escalation {
                user_message,
                manager_alert,
            }) => ToolRound::Escalation(Escalation {
                user_message,
                manager_alert,
            }),
            Err(err) => {
                warn!(agent = %self.name, tool = name, %err, "tool execution failed");
                ToolRound::Text(format!("tool {name} failed: {err}"))
            }
        }
    }
}

enum ToolRound {
    Text(String),
    Escalation(Escalation),
}
