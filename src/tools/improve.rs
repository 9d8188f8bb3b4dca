use schemars::JsonSchema;
use serde::Deserialize;

use super::enums::Framework;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImproveComponentRequest {
    /// Name of the component.
    pub name: String,
    /// Existing component source.
    #[serde(alias = "currentCode")]
    pub current_code: String,
    /// Improvements to make, at least one.
    pub improvements: Vec<String>,
    /// Target framework: "react" (default) or "nextjs".
    #[serde(default)]
    pub framework: Framework,
}
