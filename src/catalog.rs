//! Static catalog of UI pattern templates, embedded at build time.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::tools::enums::TemplateCategory;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TemplateVariant {
    pub name: String,
    pub description: String,
    pub modifications: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UiTemplate {
    pub name: String,
    pub category: String,
    pub description: String,
    pub visual_pattern: String,
    pub shadcn_components: Vec<String>,
    pub responsive_features: Vec<String>,
    pub accessibility_features: Vec<String>,
    #[serde(default)]
    pub variants: Vec<TemplateVariant>,
}

impl UiTemplate {
    pub fn variant(&self, name: &str) -> Option<&TemplateVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// `query` must already be lowercase.
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
            || self.visual_pattern.to_lowercase().contains(query)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    templates: Vec<UiTemplate>,
}

static TEMPLATES: LazyLock<Vec<UiTemplate>> = LazyLock::new(|| {
    match toml::from_str::<CatalogFile>(include_str!("catalog.toml")) {
        Ok(file) => file.templates,
        Err(e) => {
            tracing::error!("embedded template catalog is invalid: {e}");
            Vec::new()
        }
    }
});

/// Exact-name lookup.
pub fn get(name: &str) -> Option<&'static UiTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

pub fn all() -> &'static [UiTemplate] {
    &TEMPLATES
}

/// Templates in `category`; [`TemplateCategory::All`] returns everything.
pub fn by_category(category: TemplateCategory) -> Vec<&'static UiTemplate> {
    TEMPLATES
        .iter()
        .filter(|t| category == TemplateCategory::All || t.category == category.as_str())
        .collect()
}

/// Case-insensitive substring match over name, description and visual pattern.
pub fn search(query: &str) -> Vec<&'static UiTemplate> {
    let q = query.to_lowercase();
    TEMPLATES.iter().filter(|t| t.matches(&q)).collect()
}

/// Templates in `category` that also match `query`. A blank or missing query
/// filters nothing.
pub fn select(category: TemplateCategory, query: Option<&str>) -> Vec<&'static UiTemplate> {
    let mut templates = by_category(category);
    if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
        let q = q.to_lowercase();
        templates.retain(|t| t.matches(&q));
    }
    templates
}

/// Names of every template, for error messages.
pub fn names() -> Vec<&'static str> {
    TEMPLATES.iter().map(|t| t.name.as_str()).collect()
}
