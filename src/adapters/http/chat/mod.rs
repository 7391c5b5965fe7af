//! HTTP adapter for the chat module.
//!
//! Exposes message delivery and reset over REST:
//!
//! - `POST /api/chat/message` - deliver one inbound message to a chat
//! - `POST /api/chat/reset` - clear a chat's continuation state
//! - `GET /health` - liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::ChatAppState;
pub use routes::chat_router;
