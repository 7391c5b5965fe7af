//! Agents: the stage classifier, per-stage handlers, their shared base
//! agent, the handler registry, and the declared tools.

pub mod agent;
pub mod handler;
pub mod registry;
pub mod stage_detector;
pub mod tools;

pub use agent::{Agent, AgentError, AgentReply, Escalation};
pub use handler::{build_handler, HandlerDeps, HandlerOutcome, StageHandler, FALLBACK_REPLY};
pub use registry::{config_fingerprint, HandlerRegistry};
pub use stage_detector::{Classification, ClassifierDecision, StageDetector};
pub use tools::{CatalogTool, EscalateTool, ServiceCatalog};
