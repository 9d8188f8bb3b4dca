use schemars::JsonSchema;
use serde::Deserialize;

use super::default_existing_components;
use super::enums::Framework;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeRequirementsRequest {
    /// UI requirements to break down into components.
    pub description: String,
    /// Target framework: "react" (default) or "nextjs".
    #[serde(default)]
    pub framework: Framework,
    /// Available shadcn/ui components to leverage. Defaults to a common set
    /// (button, card, input, dialog, ...).
    #[serde(default = "default_existing_components", alias = "existingComponents")]
    pub existing_components: Vec<String>,
}
