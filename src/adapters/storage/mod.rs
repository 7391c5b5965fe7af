//! Non-durable storage adapters.

pub mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
