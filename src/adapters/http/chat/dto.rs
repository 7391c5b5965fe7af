//! HTTP DTOs for the chat endpoints.
//!
//! These types define the JSON request/response structure for the chat API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::TurnReport;
use crate::domain::{Stage, TurnPhase};

/// Request to deliver one inbound message to a chat.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliverMessageRequest {
    /// Stable identifier of the conversation.
    pub chat_id: String,
    /// The user's message text.
    pub message: String,
}

/// Request to clear a chat's continuation state.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetChatRequest {
    /// Stable identifier of the conversation.
    pub chat_id: String,
}

/// Response for a completed message pass.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    /// Assistant reply to show the user.
    pub reply: String,
    /// Stage the message was routed to, if one was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Name of the handler that produced the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handled_by: Option<String>,
    /// Whether the turn ended with a handoff to a human operator.
    pub escalated: bool,
}

impl From<TurnReport> for TurnResponse {
    fn from(report: TurnReport) -> Self {
        Self {
            reply: report.reply,
            stage: report.stage,
            handled_by: report.handled_by,
            escalated: report.phase == TurnPhase::EscalatedToHuman,
        }
    }
}

/// Error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }
}
