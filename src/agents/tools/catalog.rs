//! Service catalog tool.
//!
//! The catalog is static data loaded once at startup from a JSON file and
//! shared read-only across all handlers. The tool renders it as text for
//! the model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{Tool, ToolContext, ToolError, ToolOutcome};

/// One service offered by the salon.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Static service catalog, loaded once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceCatalog {
    pub services: Vec<ServiceEntry>,
}

impl ServiceCatalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CatalogLoadError::Io(path.as_ref().display().to_string(), e.to_string()))?;
        Self::from_json(&contents).map_err(CatalogLoadError::Parse)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Render the catalog as text for the model.
    pub fn render(&self) -> String {
        if self.services.is_empty() {
            return "The service catalog is currently unavailable.".to_string();
        }
        let mut out = String::from("Available services:\n");
        for entry in &self.services {
            out.push_str(&format!("- {} ({})", entry.name, entry.price));
            if let Some(minutes) = entry.duration_minutes {
                out.push_str(&format!(", {minutes} min"));
            }
            if let Some(description) = &entry.description {
                out.push_str(&format!(": {description}"));
            }
            out.push('\n');
        }
        out
    }
}

/// Catalog loading errors (startup only).
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog file {0}: {1}")]
    Io(String, String),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tool exposing the catalog to the model.
pub struct CatalogTool {
    catalog: Arc<ServiceCatalog>,
}

impl CatalogTool {
    pub fn new(catalog: Arc<ServiceCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for CatalogTool {
    fn name(&self) -> &str {
        "get_services"
    }

    fn description(&self) -> &str {
        "Get the list of offered services with prices and durations. Use \
         this for any question about what the salon offers; never invent \
         services or prices."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn invoke(
        &self,
        _args: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolOutcome, ToolError> {
        Ok(ToolOutcome::Text(self.catalog.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "services": [
            { "name": "Haircut", "price": "2500 RUB", "duration_minutes": 60 },
            { "name": "Manicure", "price": "1800 RUB", "description": "classic" }
        ]
    }"#;

    #[test]
    fn parses_catalog_json() {
        let catalog = ServiceCatalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(catalog.services.len(), 2);
        assert_eq!(catalog.services[0].duration_minutes, Some(60));
        assert_eq!(catalog.services[1].description.as_deref(), Some("classic"));
    }

    #[test]
    fn render_lists_every_service() {
        let catalog = ServiceCatalog::from_json(CATALOG_JSON).unwrap();
        let text = catalog.render();
        assert!(text.contains("Haircut (2500 RUB), 60 min"));
        assert!(text.contains("Manicure (1800 RUB): classic"));
    }

    #[test]
    fn empty_catalog_renders_unavailable() {
        let catalog = ServiceCatalog::default();
        assert!(catalog.render().contains("unavailable"));
    }

    #[tokio::test]
    async fn tool_returns_rendered_catalog() {
        let catalog = Arc::new(ServiceCatalog::from_json(CATALOG_JSON).unwrap());
        let tool = CatalogTool::new(catalog);

        let outcome = tool
            .invoke(
                serde_json::json!({}),
                &ToolContext {
                    chat_id: "chat-1".into(),
                },
            )
            .await
            .unwrap();

        match outcome {
            ToolOutcome::Text(text) => assert!(text.contains("Haircut")),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
