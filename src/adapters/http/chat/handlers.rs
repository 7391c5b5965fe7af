//! HTTP handlers for the chat endpoints.
//!
//! These handlers connect Axum routes to the application-layer router.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::Router as MessageRouter;

use super::dto::{DeliverMessageRequest, ErrorResponse, ResetChatRequest, TurnResponse};

/// Shared application state for chat endpoints.
#[derive(Clone)]
pub struct ChatAppState {
    pub router: Arc<MessageRouter>,
}

impl ChatAppState {
    pub fn new(router: Arc<MessageRouter>) -> Self {
        Self { router }
    }
}

/// `POST /api/chat/message` - deliver one inbound message.
pub async fn deliver_message(
    State(state): State<ChatAppState>,
    Json(request): Json<DeliverMessageRequest>,
) -> impl IntoResponse {
    if request.chat_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("chat_id must not be empty")),
        )
            .into_response();
    }
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("message must not be empty")),
        )
            .into_response();
    }

    let report = state.router.deliver(&request.chat_id, &request.message).await;
    (StatusCode::OK, Json(TurnResponse::from(report))).into_response()
}

/// `POST /api/chat/reset` - clear a chat's continuation state.
pub async fn reset_chat(
    State(state): State<ChatAppState>,
    Json(request): Json<ResetChatRequest>,
) -> impl IntoResponse {
    if request.chat_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("chat_id must not be empty")),
        )
            .into_response();
    }

    let report = state.router.reset(&request.chat_id).await;
    (StatusCode::OK, Json(TurnResponse::from(report))).into_response()
}

/// `GET /health` - liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
