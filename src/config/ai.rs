//! Completion service configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Completion service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the completion service
    pub api_key: Secret<String>,

    /// Project (cloud folder) identifier sent with every request
    pub project: String,

    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model URI; defaults to the project's latest general model
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Token generation ceiling
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The model URI to use, falling back to the project default.
    pub fn model_uri(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| format!("gpt://{}/yandexgpt/latest", self.project))
    }

    /// Validate completion service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("AI_API_KEY"));
        }
        if self.project.is_empty() {
            return Err(ValidationError::MissingRequired("AI_PROJECT"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidCompletionUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidCompletionTimeout);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://rest-assistant.api.cloud.yandex.net/v1".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_max_output_tokens() -> u32 {
    800
}

fn default_temperature() -> f32 {
    0.1
}
