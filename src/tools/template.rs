use schemars::JsonSchema;
use serde::Deserialize;

use super::enums::{Framework, TemplateCategory};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateFromTemplateRequest {
    /// Catalog template name (see `list_templates`), e.g. "login-form".
    pub template: String,
    /// Name of the component to generate.
    pub name: String,
    /// Template variant, e.g. "with-social".
    pub variant: Option<String>,
    /// Visual customizations to apply.
    #[serde(default)]
    pub customizations: Vec<String>,
    /// Target framework: "react" (default) or "nextjs".
    #[serde(default)]
    pub framework: Framework,
    /// Available shadcn/ui components.
    #[serde(default, alias = "existingComponents")]
    pub existing_components: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListTemplatesRequest {
    /// "forms", "cards", "navigation", "layouts", "data-display", "modals"
    /// or "all" (default).
    #[serde(default)]
    pub category: TemplateCategory,
    /// Case-insensitive text matched against template names, descriptions
    /// and visual patterns, e.g. "login".
    pub query: Option<String>,
    /// Target framework: "react" (default) or "nextjs".
    #[serde(default)]
    pub framework: Framework,
}
