//! Completion client adapters.

pub mod http_client;
pub mod mock_client;

pub use http_client::{HttpCompletionClient, HttpCompletionConfig};
pub use mock_client::MockCompletionClient;
