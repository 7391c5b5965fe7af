//! Dialogue Router - stage-routed conversational assistant
//!
//! Inbound chat messages are classified into a closed set of dialogue
//! stages, dispatched to a stage-specific handler backed by a remote
//! completion service, and threaded through an opaque continuation token
//! so the service keeps the conversation history. Per-chat state survives
//! restarts in PostgreSQL.

pub mod adapters;
pub mod agents;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
