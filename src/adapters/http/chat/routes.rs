//! Route configuration for the chat endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{deliver_message, health, reset_chat, ChatAppState};

/// Creates the chat router with all endpoints.
///
/// Routes:
/// - `POST /api/chat/message` - deliver one inbound message
/// - `POST /api/chat/reset` - clear a chat's continuation state
/// - `GET /health` - liveness probe
pub fn chat_router() -> Router<ChatAppState> {
    Router::new()
        .route("/api/chat/message", post(deliver_message))
        .route("/api/chat/reset", post(reset_chat))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::ai::MockCompletionClient;
    use crate::adapters::escalation::TracingEscalationNotifier;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::agents::{HandlerDeps, HandlerRegistry, ServiceCatalog, StageDetector};
    use crate::application::{AmbiguityPolicy, Router as MessageRouter};
    use crate::ports::ResponseOutput;

    use super::*;

    async fn scripted_state(script: Vec<ResponseOutput>) -> ChatAppState {
        let client = Arc::new(MockCompletionClient::new());
        for output in script {
            client.push_output(output).await;
        }

        let deps = HandlerDeps {
            client: client.clone(),
            notifier: Arc::new(TracingEscalationNotifier::new()),
            catalog: Arc::new(ServiceCatalog::default()),
        };
        let registry = Arc::new(HandlerRegistry::new("test-fp", deps));
        let detector = StageDetector::new(client, Vec::new());
        let router = MessageRouter::new(
            Arc::new(InMemorySessionStore::new()),
            registry,
            detector,
            AmbiguityPolicy::default(),
        );

        ChatAppState::new(Arc::new(router))
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn message_endpoint_returns_the_handler_reply() {
        let state = scripted_state(vec![
            ResponseOutput::text("R1", "greeting"),
            ResponseOutput::text("R2", "Hi! How can I help you today?"),
        ])
        .await;
        let app = chat_router().with_state(state);

        let response = app
            .oneshot(json_post(
                "/api/chat/message",
                r#"{"chat_id": "chat-1", "message": "hello"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["reply"], "Hi! How can I help you today?");
        assert_eq!(body["stage"], "greeting");
        assert_eq!(body["escalated"], false);
    }

    #[tokio::test]
    async fn blank_chat_id_is_rejected() {
        let state = scripted_state(Vec::new()).await;
        let app = chat_router().with_state(state);

        let response = app
            .oneshot(json_post(
                "/api/chat/message",
                r#"{"chat_id": "  ", "message": "hello"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reset_endpoint_confirms() {
        let state = scripted_state(Vec::new()).await;
        let app = chat_router().with_state(state);

        let response = app
            .oneshot(json_post("/api/chat/reset", r#"{"chat_id": "chat-1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["reply"], crate::application::RESET_REPLY);
    }

    #[tokio::test]
    async fn health_endpoint_is_mounted() {
        let state = scripted_state(Vec::new()).await;
        let app = chat_router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
