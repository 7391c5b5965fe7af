//! Completion client port: the interface to the remote completion service.
//!
//! The service keeps conversational memory on its side; the client only
//! round-trips an opaque continuation token (`previous_response_id`). Each
//! request carries the handler's fixed instruction set, the new input items,
//! and the declared tool set; each response carries generated text, a new
//! continuation token, and any tool invocations the service wants executed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for the remote completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Execute one request against the service.
    async fn create_response(
        &self,
        request: ResponseRequest,
    ) -> Result<ResponseOutput, CompletionError>;
}

/// One request to the completion service.
#[derive(Debug, Clone)]
pub struct ResponseRequest {
    /// Fixed instruction set for this agent.
    pub instructions: String,
    /// New input items for this call: the user message on the first call of
    /// a turn, tool outputs on continuation calls.
    pub input: Vec<InputItem>,
    /// Declared tools the service may invoke mid-turn.
    pub tools: Vec<ToolDeclaration>,
    /// Continuation anchor from the previous call, forwarded verbatim.
    pub previous_response_id: Option<String>,
}

impl ResponseRequest {
    /// Request with a single user message as input.
    pub fn user_message(
        instructions: impl Into<String>,
        message: impl Into<String>,
        previous_response_id: Option<String>,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            input: vec![InputItem::UserMessage {
                content: message.into(),
            }],
            tools: Vec::new(),
            previous_response_id,
        }
    }

    /// Attach declared tools.
    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }
}

/// One input item of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem {
    /// The user's inbound message.
    UserMessage { content: String },
    /// The textual result of a locally executed tool, relayed back per the
    /// service's continuation protocol.
    ToolOutput { call_id: String, output: String },
}

/// A declared tool capability, in the service's function-tool format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub parameters: serde_json::Value,
}

/// Response from one completion call.
#[derive(Debug, Clone)]
pub struct ResponseOutput {
    /// New continuation token. Opaque; must replace the previous token.
    pub response_id: String,
    /// Generated text, if the service produced a final answer.
    pub output_text: Option<String>,
    /// Tool invocations the service wants executed before it will answer.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ResponseOutput {
    /// A plain text response (mainly for tests and mocks).
    pub fn text(response_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            response_id: response_id.into(),
            output_text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A response requesting a single tool invocation.
    pub fn tool_call(
        response_id: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            response_id: response_id.into(),
            output_text: None,
            tool_calls: vec![ToolCallRequest {
                call_id: call_id.into(),
                name: name.into(),
                arguments: arguments.into(),
            }],
        }
    }
}

/// A tool invocation reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub name: String,
    /// Raw JSON argument string as produced by the model.
    pub arguments: String,
}

/// Completion service errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Service reported it is unavailable (5xx, connection refused).
    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    /// Rate limited by the service.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// API key or project rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// The service rejected the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CompletionError {
    /// True for failures where a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::Timeout { .. }
                | CompletionError::Unavailable { .. }
                | CompletionError::RateLimited { .. }
                | CompletionError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_request_has_single_input_item() {
        let request = ResponseRequest::user_message("be brief", "hello", Some("R1".into()));

        assert_eq!(request.input.len(), 1);
        assert_eq!(
            request.input[0],
            InputItem::UserMessage {
                content: "hello".into()
            }
        );
        assert_eq!(request.previous_response_id.as_deref(), Some("R1"));
        assert!(request.tools.is_empty());
    }

    #[test]
    fn text_response_has_no_tool_calls() {
        let output = ResponseOutput::text("R2", "Welcome");
        assert_eq!(output.response_id, "R2");
        assert_eq!(output.output_text.as_deref(), Some("Welcome"));
        assert!(output.tool_calls.is_empty());
    }

    #[test]
    fn retryable_classification() {
        assert!(CompletionError::Timeout { timeout_secs: 30 }.is_retryable());
        assert!(CompletionError::Unavailable { message: "down".into() }.is_retryable());
        assert!(CompletionError::Network("reset".into()).is_retryable());
        assert!(CompletionError::RateLimited { retry_after_secs: 1 }.is_retryable());

        assert!(!CompletionError::AuthenticationFailed.is_retryable());
        assert!(!CompletionError::Parse("bad json".into()).is_retryable());
        assert!(!CompletionError::InvalidRequest("no model".into()).is_retryable());
    }

    #[test]
    fn completion_client_is_object_safe() {
        fn _accepts_dyn(_client: &dyn CompletionClient) {}
    }
}
