//! Ports: trait contracts between the router core and its collaborators.
//! Adapters implement these; the core depends only on the traits.

pub mod completion_client;
pub mod escalation;
pub mod session_store;
pub mod tool;

pub use completion_client::{
    CompletionClient, CompletionError, InputItem, ResponseOutput, ResponseRequest,
    ToolCallRequest, ToolDeclaration,
};
pub use escalation::{EscalationError, EscalationNotifier};
pub use session_store::{SessionStore, SessionStoreError};
pub use tool::{declaration, Tool, ToolContext, ToolError, ToolOutcome};
