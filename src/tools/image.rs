use schemars::JsonSchema;
use serde::Deserialize;

use super::enums::{ComponentType, Framework};
use super::{default_true, existing_or_default};
use crate::dispatch::ImageInput;
use crate::prompts::{self, fill};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateFromImageRequest {
    /// Name of the component to generate.
    pub name: String,
    /// "ui_component" (default), "page_component" or "layout_component".
    #[serde(default, rename = "type")]
    pub kind: ComponentType,
    /// What the component should do.
    pub description: String,
    /// One to five images (wireframes, designs, screenshots, references).
    pub images: Vec<ImageInput>,
    /// Target framework: "react" (default) or "nextjs".
    #[serde(default)]
    pub framework: Framework,
    /// Make the component responsive (default true).
    #[serde(default = "default_true")]
    pub responsive: bool,
    /// Include accessibility features (default true).
    #[serde(default = "default_true")]
    pub accessibility: bool,
    /// Available shadcn/ui components.
    #[serde(default, alias = "existingComponents")]
    pub existing_components: Vec<String>,
    /// Specific instructions for analyzing the images.
    #[serde(alias = "imageAnalysisPrompt")]
    pub image_analysis_prompt: Option<String>,
}

impl GenerateFromImageRequest {
    /// Image kinds joined for the prompt ("wireframe, screenshot").
    pub fn image_kinds(&self) -> String {
        self.images
            .iter()
            .map(|i| i.kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Text part of the multimodal request. The images follow it.
    pub fn prompt(&self) -> String {
        let layout = if self.responsive {
            "fully responsive"
        } else {
            "desktop-optimized"
        };
        let accessibility_note = if self.accessibility {
            "Include comprehensive accessibility features."
        } else {
            ""
        };

        fill(
            prompts::IMAGE_COMPONENT_PROMPT,
            &[
                ("component_name", self.name.as_str().into()),
                ("image_kinds", self.image_kinds().into()),
                ("description", self.description.as_str().into()),
                (
                    "existing_components",
                    existing_or_default(&self.existing_components).into(),
                ),
                ("component_type", self.kind.as_str().into()),
                ("framework", self.framework.as_str().into()),
                ("layout", layout.into()),
                ("accessibility_note", accessibility_note.into()),
            ],
        )
    }
}
