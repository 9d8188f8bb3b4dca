pub mod analyze;
pub mod configure;
pub mod enums;
pub mod generate;
pub mod image;
pub mod improve;
pub mod template;

/// shadcn/ui components assumed available when the caller lists none.
pub const DEFAULT_EXISTING_COMPONENTS: [&str; 14] = [
    "button",
    "card",
    "input",
    "dialog",
    "dropdown-menu",
    "sheet",
    "table",
    "avatar",
    "badge",
    "separator",
    "tabs",
    "accordion",
    "alert",
    "progress",
];

/// The caller's component list, or the defaults when it is empty.
pub fn existing_or_default(components: &[String]) -> Vec<String> {
    if components.is_empty() {
        DEFAULT_EXISTING_COMPONENTS
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        components.to_vec()
    }
}

pub(crate) fn default_existing_components() -> Vec<String> {
    existing_or_default(&[])
}

pub(crate) fn default_true() -> bool {
    true
}
