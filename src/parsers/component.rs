use serde::Serialize;

use super::{
    FALLBACK_COMPONENT_NAME, component_name, fenced_blocks, is_fence, list_item, section_header,
    unique_import_sources,
};

/// Structured view of a component-generation answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedComponent {
    pub code: String,
    pub name: String,
    /// Imported module paths. Order carries no meaning.
    pub imports: Vec<String>,
    /// Usage snippet, empty when the model gave none.
    pub usage: String,
    pub integration_steps: Vec<String>,
    pub customization_notes: Vec<String>,
}

/// Picks the component source out of a model answer: a script-tagged fence
/// first, then an untagged fence, then the whole trimmed text.
pub fn extract_component_code(raw: &str) -> String {
    let blocks = fenced_blocks(raw);
    blocks
        .iter()
        .find(|b| b.is_script())
        .or_else(|| blocks.iter().find(|b| b.is_untagged()))
        .map(|b| b.body.trim().to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Usage,
    Integration,
    Customization,
    Other,
}

impl SectionKind {
    fn from_label(label: &str) -> Self {
        if label.contains("USAGE") {
            Self::Usage
        } else if label.contains("INTEGRATION") {
            Self::Integration
        } else if label.contains("CUSTOMIZATION") || label.contains("CUSTOMISATION") {
            Self::Customization
        } else {
            Self::Other
        }
    }
}

struct Section<'a> {
    kind: SectionKind,
    inline: String,
    lines: Vec<&'a str>,
}

/// Splits text at all-caps header lines. Lines inside fences never start a
/// section, so code that happens to look like `FOO:` stays where it is.
fn sections(raw: &str) -> Vec<Section<'_>> {
    let mut out: Vec<Section<'_>> = Vec::new();
    let mut in_fence = false;

    for line in raw.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && let Some((label, inline)) = section_header(line) {
            out.push(Section {
                kind: SectionKind::from_label(&label),
                inline,
                lines: Vec::new(),
            });
            continue;
        }

        if let Some(current) = out.last_mut() {
            current.lines.push(line);
        }
    }

    out
}

fn section_items(section: &Section<'_>) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_fence = false;
    for line in &section.lines {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence && let Some(item) = list_item(line) {
            items.push(item.to_string());
        }
    }
    items
}

fn section_usage(section: &Section<'_>) -> String {
    let body = section.lines.join("\n");
    if let Some(block) = fenced_blocks(&body).into_iter().next() {
        return block.body.trim().to_string();
    }
    let mut text = section.inline.clone();
    if !body.trim().is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(body.trim());
    }
    text.trim().to_string()
}

pub fn parse_component(raw: &str) -> ParsedComponent {
    let code = extract_component_code(raw);
    let name = component_name(&code).unwrap_or_else(|| FALLBACK_COMPONENT_NAME.to_string());
    let imports = unique_import_sources(&code);

    let mut parsed = ParsedComponent {
        code,
        name,
        imports,
        ..Default::default()
    };

    for section in sections(raw) {
        match section.kind {
            SectionKind::Usage if parsed.usage.is_empty() => {
                parsed.usage = section_usage(&section);
            }
            SectionKind::Integration => {
                parsed.integration_steps.extend(section_items(&section));
            }
            SectionKind::Customization => {
                parsed.customization_notes.extend(section_items(&section));
            }
            _ => {}
        }
    }

    parsed
}
