//! Scripted mock completion client for tests.
//!
//! Outputs and errors are queued in order; every request is recorded so
//! tests can assert on threading of instructions, input items, and
//! continuation tokens.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{CompletionClient, CompletionError, ResponseOutput, ResponseRequest};

/// Mock [`CompletionClient`] with a scripted response queue.
#[derive(Default)]
pub struct MockCompletionClient {
    script: Mutex<VecDeque<Result<ResponseOutput, CompletionError>>>,
    requests: Mutex<Vec<ResponseRequest>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub async fn push_output(&self, output: ResponseOutput) {
        self.script.lock().await.push_back(Ok(output));
    }

    /// Queue a failure.
    pub async fn push_error(&self, error: CompletionError) {
        self.script.lock().await.push_back(Err(error));
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<ResponseRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of calls made.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn create_response(
        &self,
        request: ResponseRequest,
    ) -> Result<ResponseOutput, CompletionError> {
        self.requests.lock().await.push(request);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| {
                Err(CompletionError::Unavailable {
                    message: "mock script exhausted".into(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_script_order_and_records_requests() {
        let client = MockCompletionClient::new();
        client.push_output(ResponseOutput::text("R1", "first")).await;
        client.push_output(ResponseOutput::text("R2", "second")).await;

        let a = client
            .create_response(ResponseRequest::user_message("i", "one", None))
            .await
            .unwrap();
        let b = client
            .create_response(ResponseRequest::user_message("i", "two", Some("R1".into())))
            .await
            .unwrap();

        assert_eq!(a.response_id, "R1");
        assert_eq!(b.response_id, "R2");
        assert_eq!(client.call_count().await, 2);
        assert_eq!(
            client.requests().await[1].previous_response_id.as_deref(),
            Some("R1")
        );
    }

    #[tokio::test]
    async fn exhausted_script_reports_unavailable() {
        let client = MockCompletionClient::new();
        let result = client
            .create_response(ResponseRequest::user_message("i", "hi", None))
            .await;
        assert!(matches!(result, Err(CompletionError::Unavailable { .. })));
    }
}
