//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Completion base URL must be http(s)")]
    InvalidCompletionUrl,

    #[error("Completion timeout out of range (1-600 seconds)")]
    InvalidCompletionTimeout,

    #[error("Temperature out of range (0.0-2.0)")]
    InvalidTemperature,

    #[error("Default stage is not part of the stage vocabulary: {0}")]
    UnknownDefaultStage(String),
}
