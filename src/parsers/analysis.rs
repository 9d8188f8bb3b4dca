//! Analysis-mode parser.
//!
//! Model text is scanned line by line through a small state machine. Section
//! headers (all-caps labels, optionally numbered) switch the state; every
//! other line is handed to the handler for the current state. Nothing here
//! can fail: unknown sections are skipped and incomplete blocks are dropped.

use serde::Serialize;

use super::{field, is_fence, keyword, list_item, section_header, split_list, unquote};
use crate::tools::enums::ComponentType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub visual_purpose: String,
    pub shadcn_dependencies: Vec<String>,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualRelationship {
    pub component: String,
    pub contained_within: Option<String>,
    /// Never empty for an accepted relationship.
    pub visually_related_to: Vec<String>,
    pub shared_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentMapping {
    pub component: String,
    pub shadcn_components: Vec<String>,
    pub combinations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShadcnIntegration {
    pub component_mappings: Vec<ComponentMapping>,
    pub consistency_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedAnalysis {
    pub components_needed: Vec<ComponentSpec>,
    pub build_order: Vec<String>,
    pub visual_relationships: Vec<VisualRelationship>,
    pub shadcn_integration: ShadcnIntegration,
}

pub fn parse_analysis(raw: &str) -> ParsedAnalysis {
    let mut scanner = Scanner::default();
    let mut in_fence = false;

    for line in raw.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            scanner.feed(line);
        }
    }

    scanner.finish()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    NoSection,
    InHierarchy,
    InBuildOrder,
    InRelationships,
    InIntegration,
    /// Inside the integration section with a mapping open.
    InMappingBlock,
}

impl State {
    fn for_header(label: &str) -> Self {
        if label.contains("HIERARCHY") || label.contains("COMPONENTS NEEDED") {
            Self::InHierarchy
        } else if label.contains("BUILD ORDER") {
            Self::InBuildOrder
        } else if label.contains("RELATIONSHIP") {
            Self::InRelationships
        } else if label.contains("SHADCN") && label.contains("INTEGRATION") {
            Self::InIntegration
        } else {
            Self::NoSection
        }
    }
}

#[derive(Debug, Default)]
struct ComponentDraft {
    name: Option<String>,
    kind: Option<ComponentType>,
    visual_purpose: Option<String>,
    shadcn_dependencies: Vec<String>,
    priority: Option<Priority>,
    /// Set after an empty `Shadcn Dependencies:` line: following bullets
    /// are the dependency list.
    collecting_dependencies: bool,
}

impl ComponentDraft {
    fn build(self) -> Option<ComponentSpec> {
        let name = self.name.filter(|s| !s.is_empty())?;
        let visual_purpose = self.visual_purpose.filter(|s| !s.is_empty())?;
        Some(ComponentSpec {
            name,
            kind: self.kind?,
            visual_purpose,
            shadcn_dependencies: self.shadcn_dependencies,
            priority: self.priority.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default)]
struct RelationshipDraft {
    component: String,
    contained_within: Option<String>,
    visually_related_to: Vec<String>,
    shared_patterns: Option<Vec<String>>,
}

impl RelationshipDraft {
    fn build(self) -> Option<VisualRelationship> {
        if self.component.is_empty() || self.visually_related_to.is_empty() {
            return None;
        }
        Some(VisualRelationship {
            component: self.component,
            contained_within: self.contained_within,
            visually_related_to: self.visually_related_to,
            shared_patterns: self.shared_patterns,
        })
    }
}

#[derive(Debug, Default)]
struct MappingDraft {
    component: String,
    shadcn_components: Vec<String>,
    combinations: Vec<String>,
}

impl MappingDraft {
    fn build(self) -> Option<ComponentMapping> {
        if self.component.is_empty() || self.shadcn_components.is_empty() {
            return None;
        }
        Some(ComponentMapping {
            component: self.component,
            shadcn_components: self.shadcn_components,
            combinations: self.combinations,
        })
    }
}

#[derive(Default)]
struct Scanner {
    state: State,
    out: ParsedAnalysis,
    component: Option<ComponentDraft>,
    relationship: Option<RelationshipDraft>,
    mapping: Option<MappingDraft>,
}

const SHADCN_LABELS: [&str; 4] = ["shadcn components", "shadcn/ui components", "uses", "shadcn"];
const COMBINATION_LABELS: [&str; 4] = [
    "combinations",
    "recommended combinations",
    "combines",
    "combination",
];

impl Scanner {
    fn feed(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        if let Some((label, inline)) = section_header(line) {
            self.flush();
            self.state = State::for_header(&label);
            if self.state == State::InBuildOrder && !inline.is_empty() {
                self.out.build_order.extend(split_list(&inline));
            }
            return;
        }

        match self.state {
            State::NoSection => {}
            State::InHierarchy => self.hierarchy_line(line),
            State::InBuildOrder => {
                if let Some(item) = list_item(line) {
                    self.out.build_order.push(item.to_string());
                }
            }
            State::InRelationships => self.relationship_line(line),
            State::InIntegration | State::InMappingBlock => self.integration_line(line),
        }
    }

    fn finish(mut self) -> ParsedAnalysis {
        self.flush();
        self.out
    }

    fn flush(&mut self) {
        self.flush_component();
        self.flush_relationship();
        self.flush_mapping();
    }

    fn flush_component(&mut self) {
        if let Some(spec) = self.component.take().and_then(ComponentDraft::build) {
            self.out.components_needed.push(spec);
        }
    }

    fn flush_relationship(&mut self) {
        if let Some(rel) = self.relationship.take().and_then(RelationshipDraft::build) {
            self.out.visual_relationships.push(rel);
        }
    }

    fn flush_mapping(&mut self) {
        if let Some(mapping) = self.mapping.take().and_then(MappingDraft::build) {
            self.out.shadcn_integration.component_mappings.push(mapping);
        }
        if self.state == State::InMappingBlock {
            self.state = State::InIntegration;
        }
    }

    // -----------------------------------------------------------------------
    // Component hierarchy
    // -----------------------------------------------------------------------

    fn hierarchy_line(&mut self, line: &str) {
        if let Some(name) = field(line, "Name") {
            self.flush_component();
            self.component = Some(ComponentDraft {
                name: Some(unquote(&name).to_string()),
                ..Default::default()
            });
            return;
        }

        // Fields before the first `Name:` belong to no block.
        let Some(draft) = self.component.as_mut() else {
            return;
        };

        if let Some(value) = field(line, "Type") {
            draft.collecting_dependencies = false;
            draft.kind = ComponentType::parse(&keyword(&value));
        } else if let Some(value) = field(line, "Visual Purpose") {
            draft.collecting_dependencies = false;
            draft.visual_purpose = Some(value);
        } else if let Some(value) = field(line, "Shadcn Dependencies") {
            draft.shadcn_dependencies = split_list(&value);
            draft.collecting_dependencies = value.is_empty();
        } else if let Some(value) = field(line, "Priority") {
            draft.collecting_dependencies = false;
            if let Some(p) = Priority::parse(&keyword(&value)) {
                draft.priority = Some(p);
            }
        } else if draft.collecting_dependencies
            && let Some(item) = list_item(line)
            && !item.contains(':')
        {
            draft.shadcn_dependencies.push(unquote(item).to_string());
        } else if line.contains(':') {
            // Any other labelled field (Visual Features, ...) ends a dependency list.
            draft.collecting_dependencies = false;
        }
    }

    // -----------------------------------------------------------------------
    // Visual relationships
    // -----------------------------------------------------------------------

    fn relationship_line(&mut self, line: &str) {
        if let Some(component) = field(line, "Component") {
            self.flush_relationship();
            self.relationship = Some(RelationshipDraft {
                component: unquote(&component).to_string(),
                ..Default::default()
            });
            return;
        }

        let lower = line.to_ascii_lowercase();

        if let Some(item) = list_item(line)
            && !item.contains(':')
            && is_component_ident(item)
        {
            self.flush_relationship();
            self.relationship = Some(RelationshipDraft {
                component: item.to_string(),
                ..Default::default()
            });
            return;
        }

        let Some(draft) = self.relationship.as_mut() else {
            return;
        };

        if let Some(value) = value_after(line, &lower, "contained within") {
            if !value.is_empty() {
                draft.contained_within = Some(value);
            }
        } else if let Some(value) = value_after(line, &lower, "visually related to")
            .or_else(|| value_after(line, &lower, "related to"))
            .or_else(|| value_after(line, &lower, "relates to"))
        {
            draft.visually_related_to = split_list(&value);
        } else if lower.contains("shared patterns") {
            let inline = line.rsplit_once(':').map(|(_, v)| v).unwrap_or("");
            draft.shared_patterns = Some(split_list(inline));
        }
    }

    // -----------------------------------------------------------------------
    // shadcn/ui integration
    // -----------------------------------------------------------------------

    fn integration_line(&mut self, line: &str) {
        if let Some(component) = field(line, "Component") {
            self.open_mapping(&component);
            return;
        }

        if self.apply_mapping_field(line) {
            return;
        }

        let Some(item) = list_item(line) else {
            return;
        };

        let lower = item.to_lowercase();
        let key = item.split_once(':').map(|(k, _)| k.trim());

        if key.is_none_or(|k| !is_component_ident(k))
            && (lower.contains("consistency") || lower.contains("pattern"))
        {
            self.out
                .shadcn_integration
                .consistency_patterns
                .push(item.to_string());
            return;
        }

        // `- ProductCard - Uses: Card, Badge`
        if let Some((head, tail)) = item.split_once(" - ")
            && is_component_ident(head.trim())
        {
            self.open_mapping(head);
            self.apply_mapping_field(tail);
            return;
        }

        // `- ProductCard: Card, Badge, Button`
        if let Some((key, value)) = item.split_once(':')
            && is_component_ident(key.trim())
        {
            self.open_mapping(key);
            let value = value.trim();
            if !value.is_empty()
                && let Some(mapping) = self.mapping.as_mut()
            {
                mapping.shadcn_components = split_list(value);
            }
        }
    }

    fn open_mapping(&mut self, component: &str) {
        self.flush_mapping();
        self.mapping = Some(MappingDraft {
            component: unquote(component).to_string(),
            ..Default::default()
        });
        self.state = State::InMappingBlock;
    }

    /// Applies a `Uses:` / `Combinations:` line to the open mapping.
    /// Returns true when the line was one of those fields.
    fn apply_mapping_field(&mut self, line: &str) -> bool {
        let shadcn = SHADCN_LABELS.iter().find_map(|l| field(line, l));
        let combos = COMBINATION_LABELS.iter().find_map(|l| field(line, l));
        if shadcn.is_none() && combos.is_none() {
            return false;
        }

        if let Some(mapping) = self.mapping.as_mut() {
            if let Some(value) = shadcn {
                mapping.shadcn_components = split_list(&value);
            }
            if let Some(value) = combos {
                mapping.combinations = split_list(&value);
            }
        }
        true
    }
}

/// Text following `marker` in `lower` (the ASCII-lowercased `line`), minus a
/// leading colon.
fn value_after(line: &str, lower: &str, marker: &str) -> Option<String> {
    let idx = lower.find(marker)?;
    let rest = &line[idx + marker.len()..];
    Some(rest.trim_start().trim_start_matches(':').trim().to_string())
}

/// A single PascalCase-ish token such as `ProductCard` or `Header`.
fn is_component_ident(s: &str) -> bool {
    let s = unquote(s);
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
