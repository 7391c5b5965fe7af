//! Message routing configuration

use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::application::AmbiguityPolicy;
use crate::domain::Stage;

use super::error::ValidationError;

/// Message routing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Path to the service catalog JSON file; omitted means an empty catalog
    pub catalog_path: Option<PathBuf>,

    /// Stage to use when classification is ambiguous and no better answer
    /// exists
    #[serde(default = "default_stage")]
    pub default_stage: String,

    /// How ambiguous classifications resolve
    #[serde(default)]
    pub ambiguity: AmbiguityMode,
}

/// Resolution mode for ambiguous classifications
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityMode {
    /// Stay in the session's last known stage, falling back to the default
    #[default]
    LastKnown,
    /// Always route ambiguous messages to the default stage
    FixedDefault,
}

impl RouterConfig {
    /// Build the runtime policy from the configured mode and default stage.
    pub fn policy(&self) -> Result<AmbiguityPolicy, ValidationError> {
        let default = Stage::from_str(&self.default_stage)
            .map_err(|_| ValidationError::UnknownDefaultStage(self.default_stage.clone()))?;
        Ok(match self.ambiguity {
            AmbiguityMode::LastKnown => AmbiguityPolicy::LastKnownStage { default },
            AmbiguityMode::FixedDefault => AmbiguityPolicy::FixedDefault(default),
        })
    }

    /// Validate routing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.policy().map(|_| ())
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            default_stage: default_stage(),
            ambiguity: AmbiguityMode::default(),
        }
    }
}

fn default_stage() -> String {
    Stage::Greeting.as_str().to_string()
}
