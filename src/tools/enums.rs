use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Target framework for generated components.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    React,
    #[serde(alias = "next", alias = "next.js")]
    Nextjs,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::React => "react",
            Self::Nextjs => "nextjs",
        }
    }
}

/// Role of a component in the page structure.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Reusable piece (button group, card, form field).
    #[default]
    UiComponent,
    /// A section of a page.
    PageComponent,
    /// Structural wrapper (shell, grid, sidebar layout).
    LayoutComponent,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UiComponent => "ui_component",
            Self::PageComponent => "page_component",
            Self::LayoutComponent => "layout_component",
        }
    }

    /// Parses the exact wire value; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ui_component" => Some(Self::UiComponent),
            "page_component" => Some(Self::PageComponent),
            "layout_component" => Some(Self::LayoutComponent),
            _ => None,
        }
    }
}

/// Template catalog category filter.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Forms,
    Cards,
    Navigation,
    Layouts,
    DataDisplay,
    Modals,
    /// No filtering.
    #[default]
    All,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forms => "forms",
            Self::Cards => "cards",
            Self::Navigation => "navigation",
            Self::Layouts => "layouts",
            Self::DataDisplay => "data-display",
            Self::Modals => "modals",
            Self::All => "all",
        }
    }
}
