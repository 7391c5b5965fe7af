//! HTTP implementation of [`CompletionClient`] for the remote responses
//! service.
//!
//! Posts to `{base_url}/responses` with bearer authentication and a project
//! header. The service holds conversational memory; each request forwards
//! the opaque `previous_response_id` verbatim and each response yields a new
//! one. Every request carries the configured timeout; a timeout maps to the
//! handler's failure path, never to corrupted continuation state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::ports::{
    CompletionClient, CompletionError, InputItem, ResponseOutput, ResponseRequest,
    ToolCallRequest, ToolDeclaration,
};

/// Configuration for the HTTP completion client.
#[derive(Debug, Clone)]
pub struct HttpCompletionConfig {
    api_key: Secret<String>,
    /// Project/folder identifier sent with every request.
    pub project: String,
    /// Service base URL.
    pub base_url: String,
    /// Model URI.
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Token generation ceiling.
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl HttpCompletionConfig {
    pub fn new(
        api_key: Secret<String>,
        project: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            project: project.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: Duration::from_secs(120),
            max_output_tokens: 800,
            temperature: 0.1,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HTTP completion client.
pub struct HttpCompletionClient {
    config: HttpCompletionConfig,
    client: Client,
}

impl HttpCompletionClient {
    pub fn new(config: HttpCompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::InvalidRequest(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.config.base_url.trim_end_matches('/'))
    }

    fn to_wire(&self, request: &ResponseRequest) -> WireRequest {
        let input = request.input.iter().map(|item| match item {
            InputItem::UserMessage { content } => WireInput::Message {
                role: "user".to_string(),
                content: content.clone(),
            },
            InputItem::ToolOutput { call_id, output } => WireInput::FunctionCallOutput {
                kind: "function_call_output",
                call_id: call_id.clone(),
                output: output.clone(),
            },
        });

        WireRequest {
            model: self.config.model.clone(),
            instructions: request.instructions.clone(),
            previous_response_id: request.previous_response_id.clone(),
            input: input.collect(),
            tools: request.tools.iter().map(WireTool::from).collect(),
            max_output_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn create_response(
        &self,
        request: ResponseRequest,
    ) -> Result<ResponseOutput, CompletionError> {
        let wire = self.to_wire(&request);

        let response = self
            .client
            .post(self.responses_url())
            .bearer_auth(self.config.api_key())
            .header("x-folder-id", &self.config.project)
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else {
                    CompletionError::Network(e.to_string())
                }
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(CompletionError::AuthenticationFailed);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30);
                return Err(CompletionError::RateLimited { retry_after_secs });
            }
            status if status.is_server_error() => {
                return Err(CompletionError::Unavailable {
                    message: format!("status {status}"),
                });
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(CompletionError::InvalidRequest(format!(
                    "status {status}: {body}"
                )));
            }
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        Ok(wire.into())
    }
}

#[derive(Serialize)]
struct WireRequest {
    model: String,
    instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    input: Vec<WireInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireInput {
    Message {
        role: String,
        content: String,
    },
    FunctionCallOutput {
        #[serde(rename = "type")]
        kind: &'static str,
        call_id: String,
        output: String,
    },
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&ToolDeclaration> for WireTool {
    fn from(decl: &ToolDeclaration) -> Self {
        Self {
            kind: "function",
            name: decl.name.clone(),
            description: decl.description.clone(),
            parameters: decl.parameters.clone(),
        }
    }
}

#[derive(Deserialize)]
struct WireResponse {
    id: String,
    #[serde(default)]
    output: Vec<WireOutputItem>,
}

#[derive(Deserialize)]
struct WireOutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
    #[serde(default)]
    content: Vec<WireContentItem>,
}

/// Entry of a `message` item's `content` array. Reply text lives in entries
/// of type `output_text`.
#[derive(Deserialize)]
struct WireContentItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl From<WireResponse> for ResponseOutput {
    fn from(wire: WireResponse) -> Self {
        let mut tool_calls = Vec::new();
        let mut texts = Vec::new();
        for item in wire.output {
            match item.kind.as_str() {
                "function_call" => {
                    if let (Some(call_id), Some(name)) = (item.call_id, item.name) {
                        tool_calls.push(ToolCallRequest {
                            call_id,
                            name,
                            arguments: item.arguments.unwrap_or_else(|| "{}".to_string()),
                        });
                    }
                }
                "message" => {
                    texts.extend(
                        item.content
                            .into_iter()
                            .filter(|entry| entry.kind == "output_text" && !entry.text.is_empty())
                            .map(|entry| entry.text),
                    );
                }
                _ => {}
            }
        }

        Self {
            response_id: wire.id,
            output_text: (!texts.is_empty()).then(|| texts.join("\n")),
            tool_calls,
        }
    }
}
