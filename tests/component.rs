//! Component-mode parsing over realistic model answers.

use v0_mcp::parsers::component::extract_component_code;
use v0_mcp::parsers::{FALLBACK_COMPONENT_NAME, parse_component};

const ANSWER: &str = r#"Here is your pricing card.

```tsx
import { Card, CardContent } from "@/components/ui/card"
import { Button } from "@/components/ui/button"

export interface PricingCardProps {
  plan: string
  price: number
}

export default function PricingCard({ plan, price }: PricingCardProps) {
  return (
    <Card>
      <CardContent>{plan}: ${price}</CardContent>
      <Button>Choose</Button>
    </Card>
  )
}
```

IMPORTS NEEDED:
- lucide-react

USAGE EXAMPLE:
```tsx
<PricingCard plan="Pro" price={29} />
```

INTEGRATION GUIDELINES:
- Place the card inside a responsive grid
- Pass plan data from your pricing config

CUSTOMIZATION NOTES:
- Adjust the accent color through Tailwind theme tokens
* Swap Button variant for a secondary plan
"#;

// ---------------------------------------------------------------------------
// Code and name
// ---------------------------------------------------------------------------

#[test]
fn code_comes_from_the_script_fence() {
    let parsed = parse_component(ANSWER);
    assert!(parsed.code.starts_with("import { Card, CardContent }"));
    assert!(parsed.code.ends_with('}'));
    assert!(!parsed.code.contains("```"));
    assert!(!parsed.code.contains("USAGE EXAMPLE"));
}

#[test]
fn name_is_the_default_export() {
    assert_eq!(parse_component(ANSWER).name, "PricingCard");
}

#[test]
fn imports_from_code_only() {
    assert_eq!(
        parse_component(ANSWER).imports,
        vec!["@/components/ui/card", "@/components/ui/button"]
    );
}

#[test]
fn fallback_name_when_nothing_is_declared() {
    let parsed = parse_component("```tsx\n<div className=\"p-4\" />\n```");
    assert_eq!(parsed.name, FALLBACK_COMPONENT_NAME);
    assert_eq!(parsed.code, "<div className=\"p-4\" />");
}

#[test]
fn unfenced_answer_is_used_whole() {
    let raw = "  export const Badge = () => <span />  \n";
    assert_eq!(extract_component_code(raw), "export const Badge = () => <span />");
    assert_eq!(parse_component(raw).name, "Badge");
}

#[test]
fn untagged_fence_used_when_no_script_fence() {
    let raw = "```css\n.a {}\n```\n```\nexport function Plain() {}\n```";
    assert_eq!(extract_component_code(raw), "export function Plain() {}");
}

// ---------------------------------------------------------------------------
// Trailing sections
// ---------------------------------------------------------------------------

#[test]
fn usage_snippet_from_its_fence() {
    assert_eq!(
        parse_component(ANSWER).usage,
        "<PricingCard plan=\"Pro\" price={29} />"
    );
}

#[test]
fn inline_usage_without_fence() {
    let raw = "```tsx\nexport default function A() {}\n```\nUSAGE EXAMPLE: <A />\n";
    assert_eq!(parse_component(raw).usage, "<A />");
}

#[test]
fn integration_and_customization_bullets() {
    let parsed = parse_component(ANSWER);
    assert_eq!(
        parsed.integration_steps,
        vec![
            "Place the card inside a responsive grid",
            "Pass plan data from your pricing config"
        ]
    );
    assert_eq!(
        parsed.customization_notes,
        vec![
            "Adjust the accent color through Tailwind theme tokens",
            "Swap Button variant for a secondary plan"
        ]
    );
}

#[test]
fn missing_sections_stay_empty() {
    let parsed = parse_component("```tsx\nexport default function A() {}\n```");
    assert!(parsed.usage.is_empty());
    assert!(parsed.integration_steps.is_empty());
    assert!(parsed.customization_notes.is_empty());
}

#[test]
fn acronym_keyed_bullet_stays_in_its_section() {
    let raw = "```tsx\nexport default function Card() {\n  return <div />\n}\n```\n\nCUSTOMIZATION NOTES:\n- Change the accent color\n- CSS: override the border radius via a variable\n- Swap the icon set\n";
    let parsed = parse_component(raw);
    assert_eq!(
        parsed.customization_notes,
        vec![
            "Change the accent color",
            "CSS: override the border radius via a variable",
            "Swap the icon set"
        ]
    );
}

#[test]
fn integration_steps_survive_aria_bullet() {
    let raw = "```tsx\nexport default function Dialog() {}\n```\n\nINTEGRATION STEPS:\n1. Mount the dialog at the root\n- ARIA: label the title element\n2. Wire the open state\n\nCUSTOMIZATION NOTES:\n- Tune the overlay opacity\n";
    let parsed = parse_component(raw);
    assert_eq!(parsed.integration_steps.len(), 3);
    assert_eq!(parsed.integration_steps[2], "Wire the open state");
    assert_eq!(parsed.customization_notes, vec!["Tune the overlay opacity"]);
}

#[test]
fn header_like_lines_in_code_do_not_open_sections() {
    let raw = "```tsx\nconst LABELS = {\n// USAGE EXAMPLE: not a section\n}\nexport default function A() {}\n```";
    let parsed = parse_component(raw);
    assert!(parsed.usage.is_empty());
    assert!(parsed.code.contains("USAGE EXAMPLE"));
}

