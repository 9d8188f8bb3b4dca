use schemars::JsonSchema;
use serde::Deserialize;

use super::default_true;
use super::enums::{ComponentType, Framework};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateComponentRequest {
    /// PascalCase component name, at most 50 characters (e.g. "PricingCard").
    pub name: String,
    /// "ui_component" (default), "page_component" or "layout_component".
    #[serde(default, rename = "type")]
    pub kind: ComponentType,
    /// What the component should do, 10 to 1000 characters.
    pub description: String,
    /// Target framework: "react" (default) or "nextjs".
    #[serde(default)]
    pub framework: Framework,
    /// Make the component responsive (default true).
    #[serde(default = "default_true")]
    pub responsive: bool,
    /// Include accessibility features (default true).
    #[serde(default = "default_true")]
    pub accessibility: bool,
    /// Available shadcn/ui components (at most 50).
    #[serde(default, alias = "existingComponents")]
    pub existing_components: Vec<String>,
    /// How the component will be used (at most 500 characters).
    #[serde(alias = "integrationContext")]
    pub integration_context: Option<String>,
    /// Stream the generation from v0 instead of waiting for one response.
    /// The tool result is the same either way.
    #[serde(default)]
    pub stream: bool,
}

pub const STANDALONE_CONTEXT: &str = "Standalone component";

impl GenerateComponentRequest {
    pub fn integration_context_or_default(&self) -> &str {
        self.integration_context
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(STANDALONE_CONTEXT)
    }
}
