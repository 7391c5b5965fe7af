//! Declared tool implementations.

pub mod catalog;
pub mod escalate;

pub use catalog::{CatalogLoadError, CatalogTool, ServiceCatalog, ServiceEntry};
pub use escalate::{EscalateTool, HANDOFF_REPLY};
