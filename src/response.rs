//! JSON envelopes returned by the tools.
//!
//! Every tool answers with one pretty-printed JSON document in a single text
//! content item. The `response_type` field tells callers which shape follows.

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::catalog::UiTemplate;
use crate::parsers::analysis::{ComponentSpec, ParsedAnalysis};
use crate::parsers::component::ParsedComponent;
use crate::parsers::{field, is_fence, list_item, section_header};
use crate::tools::enums::{ComponentType, Framework, TemplateCategory};

pub const RESPONSIVE_BREAKPOINTS: [&str; 4] =
    ["sm (640px)", "md (768px)", "lg (1024px)", "xl (1280px)"];
pub const ACCESSIBILITY_FEATURES: [&str; 3] =
    ["ARIA labels", "Keyboard navigation", "Screen reader support"];

/// Serialize `value` as the tool's single text result.
pub fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization failed: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ComponentEnvelope {
    pub response_type: &'static str,
    pub component: ComponentSection,
    pub integration: IntegrationSection,
    pub dependencies: DependencySection,
    pub notes: NotesSection,
}

#[derive(Debug, Serialize)]
pub struct ComponentSection {
    pub name: String,
    pub code: String,
    /// Always empty: file placement is the caller's decision.
    pub file_path: String,
    pub exports: Vec<String>,
    pub props_interface: PropsInterface,
}

/// Serializes as `{}` when no props interface was found.
#[derive(Debug, Default, Serialize)]
pub struct PropsInterface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationSection {
    pub imports_needed: Vec<String>,
    pub usage_example: String,
    pub integration_steps: Vec<IntegrationStep>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationStep {
    pub file: String,
    pub action: &'static str,
    pub description: String,
}

impl IntegrationStep {
    fn modify(description: impl Into<String>) -> Self {
        Self {
            file: String::new(),
            action: "modify",
            description: description.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DependencySection {
    pub npm_packages: Vec<String>,
    pub internal_components: Vec<String>,
    pub missing_components: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NotesSection {
    pub customization_hints: Vec<String>,
    pub accessibility_features: Vec<String>,
    pub responsive_breakpoints: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ComponentEnvelope {
    /// Envelope for a generated component. `name` is the caller's requested
    /// name, not the one recovered from code.
    pub fn from_parsed(
        name: &str,
        parsed: ParsedComponent,
        accessibility: bool,
        responsive: bool,
    ) -> Self {
        let npm_packages = parsed
            .imports
            .iter()
            .filter(|i| !i.starts_with("@/") && !i.starts_with("./") && !i.starts_with("../"))
            .cloned()
            .collect();
        let internal_components = parsed
            .imports
            .iter()
            .filter(|i| i.starts_with("@/components/ui/"))
            .cloned()
            .collect();

        Self {
            response_type: "component",
            component: ComponentSection {
                name: name.to_string(),
                exports: exports(&parsed.code),
                props_interface: PropsInterface {
                    props: props_interface(&parsed.code),
                },
                code: parsed.code,
                file_path: String::new(),
            },
            integration: IntegrationSection {
                imports_needed: Vec::new(),
                usage_example: usage_or_default(parsed.usage, name),
                integration_steps: parsed
                    .integration_steps
                    .into_iter()
                    .map(IntegrationStep::modify)
                    .collect(),
            },
            dependencies: DependencySection {
                npm_packages,
                internal_components,
                missing_components: Vec::new(),
            },
            notes: NotesSection {
                customization_hints: parsed.customization_notes,
                accessibility_features: if accessibility {
                    strings(&ACCESSIBILITY_FEATURES)
                } else {
                    Vec::new()
                },
                responsive_breakpoints: if responsive {
                    strings(&RESPONSIVE_BREAKPOINTS)
                } else {
                    Vec::new()
                },
            },
        }
    }

    /// Envelope for a template-based component. Dependencies and notes come
    /// from the catalog entry rather than the generated code.
    pub fn from_template(
        name: &str,
        parsed: ParsedComponent,
        template: &UiTemplate,
        customizations: &[String],
    ) -> Self {
        let mut hints = vec![format!("Based on {} template", template.name)];
        hints.extend(template.responsive_features.iter().cloned());
        hints.extend(customizations.iter().cloned());

        Self {
            response_type: "component",
            component: ComponentSection {
                name: name.to_string(),
                exports: exports(&parsed.code),
                props_interface: PropsInterface {
                    props: props_interface(&parsed.code),
                },
                code: parsed.code,
                file_path: String::new(),
            },
            integration: IntegrationSection {
                imports_needed: Vec::new(),
                usage_example: usage_or_default(parsed.usage, name),
                integration_steps: vec![IntegrationStep::modify(format!(
                    "Use the {} pattern for consistent UI design",
                    template.name
                ))],
            },
            dependencies: DependencySection {
                npm_packages: Vec::new(),
                internal_components: template
                    .shadcn_components
                    .iter()
                    .map(|c| format!("@/components/ui/{}", c.to_lowercase()))
                    .collect(),
                missing_components: Vec::new(),
            },
            notes: NotesSection {
                customization_hints: hints,
                accessibility_features: template.accessibility_features.clone(),
                responsive_breakpoints: strings(&RESPONSIVE_BREAKPOINTS),
            },
        }
    }
}

fn usage_or_default(usage: String, name: &str) -> String {
    if usage.trim().is_empty() {
        format!("<{name} />")
    } else {
        usage
    }
}

/// `default` when the code has a default export, then every
/// `export const|function|class X` name in order.
pub fn exports(code: &str) -> Vec<String> {
    let mut out = Vec::new();
    if code.contains("export default") {
        out.push("default".to_string());
    }
    for line in code.lines() {
        let mut words = line.split_whitespace();
        while let Some(w) = words.next() {
            if w != "export" {
                continue;
            }
            let mut next = words.next();
            if next == Some("async") {
                next = words.next();
            }
            if let Some("const" | "function" | "class") = next
                && let Some(raw) = words.next()
            {
                let name: String = raw
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
                    .collect();
                if !name.is_empty() && !out.contains(&name) {
                    out.push(name);
                }
            }
        }
    }
    out
}

/// Body of the first `interface XProps { … }` declaration, trimmed.
pub fn props_interface(code: &str) -> Option<String> {
    let mut search = code;
    while let Some(idx) = search.find("interface ") {
        let rest = &search[idx + "interface ".len()..];
        let ident: String = rest
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if ident.ends_with("Props")
            && ident.len() > "Props".len()
            && let Some(open) = rest.find('{')
            && let Some(close) = rest[open..].find('}')
        {
            let body = rest[open + 1..open + close].trim();
            return (!body.is_empty()).then(|| body.to_string());
        }
        search = rest;
    }
    None
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AnalysisEnvelope {
    pub response_type: &'static str,
    pub ui_breakdown: UiBreakdown,
    pub shadcn_integration: IntegrationProjection,
}

#[derive(Debug, Serialize)]
pub struct UiBreakdown {
    pub components_needed: Vec<ComponentNeed>,
    pub build_order: Vec<String>,
    pub visual_relationships: Vec<RelationshipProjection>,
}

#[derive(Debug, Serialize)]
pub struct ComponentNeed {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub visual_purpose: String,
    pub shadcn_dependencies: Vec<String>,
    pub priority: crate::parsers::analysis::Priority,
}

impl From<ComponentSpec> for ComponentNeed {
    fn from(spec: ComponentSpec) -> Self {
        Self {
            name: spec.name,
            kind: spec.kind,
            visual_purpose: spec.visual_purpose,
            shadcn_dependencies: spec.shadcn_dependencies,
            priority: spec.priority,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelationshipProjection {
    pub component: String,
    pub contained_within: Option<String>,
    pub visually_related_to: Vec<String>,
    pub shared_patterns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationProjection {
    pub component_mappings: Vec<MappingProjection>,
    pub consistency_patterns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MappingProjection {
    pub component: String,
    pub shadcn_components: Vec<String>,
    pub recommended_combinations: Vec<String>,
}

impl From<ParsedAnalysis> for AnalysisEnvelope {
    fn from(parsed: ParsedAnalysis) -> Self {
        Self {
            response_type: "ui_analysis",
            ui_breakdown: UiBreakdown {
                components_needed: parsed
                    .components_needed
                    .into_iter()
                    .map(ComponentNeed::from)
                    .collect(),
                build_order: parsed.build_order,
                visual_relationships: parsed
                    .visual_relationships
                    .into_iter()
                    .map(|r| RelationshipProjection {
                        component: r.component,
                        contained_within: r.contained_within,
                        visually_related_to: r.visually_related_to,
                        shared_patterns: r.shared_patterns.unwrap_or_default(),
                    })
                    .collect(),
            },
            shadcn_integration: IntegrationProjection {
                component_mappings: parsed
                    .shadcn_integration
                    .component_mappings
                    .into_iter()
                    .map(|m| MappingProjection {
                        component: m.component,
                        shadcn_components: m.shadcn_components,
                        recommended_combinations: m.combinations,
                    })
                    .collect(),
                consistency_patterns: parsed.shadcn_integration.consistency_patterns,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Improvement
// ---------------------------------------------------------------------------

pub const DEFAULT_CHANGE: &str = "Code improvements applied";

#[derive(Debug, Serialize)]
pub struct ImprovementEnvelope {
    pub response_type: &'static str,
    pub component: ImprovedComponent,
    pub breaking_changes: Vec<String>,
    pub migration_guide: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImprovedComponent {
    pub name: String,
    pub improved_code: String,
    pub changes_made: Vec<String>,
}

impl ImprovementEnvelope {
    pub fn new(name: &str, improved_code: String, raw: &str) -> Self {
        Self {
            response_type: "improvement",
            component: ImprovedComponent {
                name: name.to_string(),
                improved_code,
                changes_made: changes_made(raw),
            },
            breaking_changes: Vec::new(),
            migration_guide: Vec::new(),
        }
    }
}

/// Bullets under the `CHANGES MADE:` heading, up to the next heading.
/// Falls back to a single generic entry.
pub fn changes_made(raw: &str) -> Vec<String> {
    let mut changes = Vec::new();
    let mut in_section = false;
    let mut in_fence = false;

    for line in raw.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((label, inline)) = section_header(line) {
            in_section = label.contains("CHANGES MADE");
            if in_section && !inline.is_empty() {
                changes.push(inline);
            }
            continue;
        }
        // `Changes made:` written in sentence case
        if let Some(inline) = field(line, "changes made") {
            in_section = true;
            if !inline.is_empty() {
                changes.push(inline);
            }
            continue;
        }
        if in_section && let Some(item) = list_item(line) {
            changes.push(item.to_string());
        }
    }

    if changes.is_empty() {
        changes.push(DEFAULT_CHANGE.to_string());
    }
    changes
}

// ---------------------------------------------------------------------------
// Template listing
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TemplatesEnvelope {
    pub response_type: &'static str,
    pub category: TemplateCategory,
    pub framework: Framework,
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    pub category: String,
    pub description: String,
    pub visual_pattern: String,
    pub shadcn_components: Vec<String>,
    pub variants: Vec<VariantSummary>,
}

#[derive(Debug, Serialize)]
pub struct VariantSummary {
    pub name: String,
    pub description: String,
}

impl TemplatesEnvelope {
    pub fn new(
        category: TemplateCategory,
        framework: Framework,
        templates: &[&UiTemplate],
    ) -> Self {
        Self {
            response_type: "templates",
            category,
            framework,
            templates: templates
                .iter()
                .map(|t| TemplateSummary {
                    name: t.name.clone(),
                    category: t.category.clone(),
                    description: t.description.clone(),
                    visual_pattern: t.visual_pattern.clone(),
                    shadcn_components: t.shadcn_components.clone(),
                    variants: t
                        .variants
                        .iter()
                        .map(|v| VariantSummary {
                            name: v.name.clone(),
                            description: v.description.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_lists_default_and_named() {
        let code = "export const buttonVariants = cva()\nexport function Helper() {}\nexport default function Card() {}";
        assert_eq!(exports(code), vec!["default", "buttonVariants", "Helper"]);
        assert!(exports("const x = 1").is_empty());
    }

    #[test]
    fn props_interface_body() {
        let code = "interface Theme { dark: boolean }\ninterface CardProps {\n  title: string\n  price?: number\n}\nexport default function Card() {}";
        assert_eq!(
            props_interface(code).as_deref(),
            Some("title: string\n  price?: number")
        );
        assert_eq!(props_interface("export default function A() {}"), None);
    }

    #[test]
    fn props_interface_serializes_as_empty_object_when_absent() {
        let json = serde_json::to_string(&PropsInterface::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn component_envelope_defaults() {
        let parsed = ParsedComponent {
            code: "import { Card } from \"@/components/ui/card\"\nimport { motion } from \"framer-motion\"\nimport { cn } from \"./utils\"\nexport default function Hero() {}".to_string(),
            name: "Hero".to_string(),
            imports: vec![
                "@/components/ui/card".to_string(),
                "framer-motion".to_string(),
                "./utils".to_string(),
            ],
            ..Default::default()
        };
        let env = ComponentEnvelope::from_parsed("Hero", parsed, true, false);

        assert_eq!(env.response_type, "component");
        assert_eq!(env.integration.usage_example, "<Hero />");
        assert_eq!(env.dependencies.npm_packages, vec!["framer-motion"]);
        assert_eq!(env.dependencies.internal_components, vec!["@/components/ui/card"]);
        assert_eq!(env.notes.accessibility_features.len(), 3);
        assert!(env.notes.responsive_breakpoints.is_empty());
        assert_eq!(env.component.exports, vec!["default"]);
    }

    #[test]
    fn changes_made_reads_bullets_until_next_header() {
        let raw = "```tsx\nexport default function A() {}\n```\n\nCHANGES MADE:\n- Added hover state\n- Tightened spacing\n\nVISUAL ENHANCEMENTS:\n- Shadow on hover\n";
        assert_eq!(
            changes_made(raw),
            vec!["Added hover state", "Tightened spacing"]
        );
        assert_eq!(changes_made("no section here"), vec![DEFAULT_CHANGE]);
    }

    #[test]
    fn analysis_envelope_defaults_shared_patterns() {
        let parsed = crate::parsers::parse_analysis(
            "3. VISUAL RELATIONSHIPS:\n- Component: ProductCard\n- Visually related to: ProductGrid\n",
        );
        let env = AnalysisEnvelope::from(parsed);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["response_type"], "ui_analysis");
        assert_eq!(
            json["ui_breakdown"]["visual_relationships"][0]["shared_patterns"],
            serde_json::json!([])
        );
    }
}
