//! Prompt templates sent to the v0 model.
//!
//! Section headers in these templates are the same labels the parsers look
//! for, so a change to one side must be mirrored on the other.

pub const ANALYZE_REQUIREMENTS_PROMPT: &str = "\
You are a UI component architect working with React and shadcn/ui. Break the \
request below into well-structured, visually polished components. Only cover UI \
structure and visual hierarchy: file paths, data flow and project setup are out \
of scope.

USER REQUEST: {description}

AVAILABLE SHADCN/UI COMPONENTS: {existing_components}
FRAMEWORK: {framework}

Answer with the numbered sections below, using these exact headings.

1. VISUAL COMPONENT HIERARCHY:
For each component give:
- Name: PascalCase name (e.g. ProductImageGallery)
- Type: ui_component | page_component | layout_component
- Visual Purpose: what the component shows or handles
- Shadcn Dependencies: comma-separated shadcn/ui components it uses
- Visual Features: animations, transitions, hover states
- Priority: high | medium | low

2. COMPONENT BUILD ORDER:
One component per line, foundational components first.

3. VISUAL RELATIONSHIPS:
For each component give:
- Component: name
- Contained within: parent component, if any
- Visually related to: comma-separated component names
- Shared patterns: comma-separated shared props or visual patterns

4. SHADCN/UI INTEGRATION:
For each component give:
- Component: name
- Uses: comma-separated shadcn/ui components
- Combinations: recommended component combinations
Then list visual consistency patterns as bullets.

5. VISUAL POLISH RECOMMENDATIONS:
Areas where custom styling, animation or color work will lift the design.
";

pub const GENERATE_COMPONENT_PROMPT: &str = "\
You are an expert {framework} developer building polished, production-ready UI \
components with shadcn/ui and Tailwind CSS.

COMPONENT REQUIREMENTS:
- Name: {component_name}
- Type: {component_type}
- Description: {description}

TECHNICAL SPECIFICATIONS:
- Framework: {framework}
- TypeScript with typed props
- shadcn/ui components and Tailwind CSS classes only
- Responsive: {responsive}
- Accessibility: {accessibility}

AVAILABLE COMPONENTS:
{existing_components}

INTEGRATION CONTEXT:
{integration_context}

RULES:
1. Use an available shadcn/ui component whenever one fits; compose rather than recreate.
2. Where shadcn/ui has no match, build a custom piece in the same visual language.
3. Include every import at the top of the file.
4. Export as default: export default function {component_name}
5. Define a TypeScript props interface named {component_name}Props when the component takes props.
6. Give attention to spacing, hover and focus states, loading and empty states, and color contrast.

OUTPUT FORMAT:
```tsx
// complete component code
```

After the code block add these sections:
IMPORTS NEEDED: npm packages required (no file paths)
USAGE EXAMPLE: a short snippet in a tsx code block
INTEGRATION GUIDELINES: bullet list of integration steps (no specific file names)
CUSTOMIZATION NOTES: bullet list of common adjustments
";

pub const IMPROVE_COMPONENT_PROMPT: &str = "\
You are reviewing a {framework} component built with shadcn/ui. Apply the \
requested improvements and raise its visual quality without changing its props \
interface or core behavior.

CURRENT CODE:
```tsx
{current_code}
```

IMPROVEMENT REQUESTS:
{improvements_requested}

CONSTRAINTS:
- Keep the same props interface
- Keep using shadcn/ui components
- Framework: {framework}

OUTPUT FORMAT:
```tsx
// improved component code
```

CHANGES MADE:
- one bullet per functional or visual change

VISUAL ENHANCEMENTS:
- one bullet per visual improvement

NOTES:
- anything else worth knowing
";

pub const IMAGE_COMPONENT_PROMPT: &str = "\
Build a polished {component_name} component from the attached {image_kinds}.

{description}

REQUIREMENTS:
1. Match the layout and visual structure of the images, refined with modern polish.
2. Use these shadcn/ui components where they fit: {existing_components}
3. Add hover and focus states, smooth transitions and loading states where appropriate.
4. Keep spacing and alignment consistent.

Component type: {component_type}
Framework: {framework}
Layout: {layout}
{accessibility_note}
";

pub const TEMPLATE_COMPONENT_PROMPT: &str = "\
Build a polished {component_name} component using the {template} template pattern.

Template Description: {template_description}
Visual Pattern: {visual_pattern}
Required shadcn/ui components: {shadcn_components}
Responsive features: {responsive_features}
Accessibility features: {accessibility_features}

Treat the template as a starting point: refine spacing, depth, transitions and \
empty or loading states.

Available shadcn/ui components: {existing_components}
Framework: {framework}
";

/// Renders the optional variant and customization tail of a template prompt.
pub fn template_extras(
    variant: Option<(&str, &str, &[String])>,
    customizations: &[String],
) -> String {
    let mut out = String::new();
    if let Some((name, description, modifications)) = variant {
        out.push_str(&format!(
            "\nVariant: {name} - {description}\nVariant modifications: {}\n",
            modifications.join(", ")
        ));
    }
    if !customizations.is_empty() {
        out.push_str(&format!("\nCustomizations: {}\n", customizations.join(", ")));
    }
    out
}

/// Value substituted into a `{placeholder}`.
#[derive(Debug, Clone)]
pub enum PromptValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl PromptValue {
    fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Flag(b) => b.to_string(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for PromptValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PromptValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for PromptValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<Vec<String>> for PromptValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[String]> for PromptValue {
    fn from(items: &[String]) -> Self {
        Self::List(items.to_vec())
    }
}

/// Replaces every `{key}` in `template` in a single pass, so braces inside
/// substituted values (JSX, user code) are never expanded. Placeholders
/// without a value are left in place.
pub fn fill(template: &str, vars: &[(&str, PromptValue)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (v.render(), close))
        });
        match value {
            Some((rendered, close)) => {
                out.push_str(&rendered);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
