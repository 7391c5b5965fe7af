//! Tool port: declared callable capabilities.
//!
//! A tool is a capability the remote service may invoke mid-turn. Tools run
//! locally, receive the current chat's context, and return a short text
//! result that is fed back into the same turn. Tool errors never reach the
//! end user as exceptions; the agent converts them to textual results.

use async_trait::async_trait;

use super::completion_client::ToolDeclaration;

/// Context passed to every tool invocation.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Channel identifier of the conversation that triggered the call.
    pub chat_id: String,
}

/// Outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Text result fed back into the turn.
    Text(String),
    /// The tool handed the conversation to a human. The agent stops the
    /// turn and relays the user-facing message as the final reply.
    Escalation {
        user_message: String,
        manager_alert: String,
    },
}

/// A declared tool capability.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to invoke this tool.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool.
    async fn invoke(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutcome, ToolError>;
}

/// Build the wire declaration for a tool.
pub fn declaration(tool: &dyn Tool) -> ToolDeclaration {
    ToolDeclaration {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters_schema(),
    }
}

/// Tool execution errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    /// Arguments did not match the tool's schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool's side effect or lookup failed.
    #[error("tool execution failed: {0}")]
    Execution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes its input"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }

        async fn invoke(
            &self,
            args: serde_json::Value,
            _ctx: &ToolContext,
        ) -> Result<ToolOutcome, ToolError> {
            let text = args
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidArguments("missing text".into()))?;
            Ok(ToolOutcome::Text(text.to_string()))
        }
    }

    #[tokio::test]
    async fn declaration_carries_name_and_schema() {
        let tool = EchoTool;
        let decl = declaration(&tool);

        assert_eq!(decl.name, "echo");
        assert_eq!(decl.parameters["required"][0], "text");
    }

    #[tokio::test]
    async fn invalid_arguments_become_an_error() {
        let tool = EchoTool;
        let ctx = ToolContext {
            chat_id: "chat-1".into(),
        };

        let result = tool.invoke(serde_json::json!({}), &ctx).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
