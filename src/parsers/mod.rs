//! Line-oriented readers for free-text model answers.
//!
//! Parsing never fails: the text is generated prose with no enforced
//! structure, so missing or garbled sections yield empty fields instead of
//! errors.

pub mod analysis;
pub mod component;

pub use analysis::parse_analysis;
pub use component::parse_component;

/// Name used when no component identifier can be recovered.
pub const FALLBACK_COMPONENT_NAME: &str = "GeneratedComponent";

/// A ```-delimited region of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Language hint after the opening fence, lowercased ("" when untagged).
    pub tag: String,
    /// Inner text, fence lines excluded.
    pub body: String,
}

impl FencedBlock {
    pub fn is_script(&self) -> bool {
        is_script_tag(&self.tag)
    }

    pub fn is_untagged(&self) -> bool {
        self.tag.is_empty()
    }
}

pub fn is_script_tag(tag: &str) -> bool {
    matches!(
        tag,
        "tsx" | "jsx" | "ts" | "js" | "typescript" | "javascript" | "react"
    )
}

pub fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// All closed fenced blocks in document order. An opening fence with no
/// closing fence is not a block.
pub fn fenced_blocks(text: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        match open.take() {
            None => {
                if let Some(rest) = trimmed.strip_prefix("```") {
                    let tag = rest
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .to_lowercase();
                    open = Some((tag, Vec::new()));
                }
            }
            Some((tag, mut body)) => {
                if trimmed.starts_with("```") {
                    blocks.push(FencedBlock {
                        tag,
                        body: body.join("\n"),
                    });
                } else {
                    body.push(line);
                    open = Some((tag, body));
                }
            }
        }
    }

    blocks
}

/// Strips a bullet (`-`, `*`, `•`) or numbered (`1.`, `1)`) list marker.
/// Returns `None` when the line is not a list item.
pub fn list_item(line: &str) -> Option<&str> {
    let t = line.trim();
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = t.strip_prefix(bullet) {
            return Some(rest.trim());
        }
    }

    let digits = t.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &t[digits..];
    rest.strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))
        .map(str::trim)
}

/// Removes markdown emphasis and heading markers so `**Name:**` and
/// `### USAGE EXAMPLE:` read like their plain forms.
fn strip_markup(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .replace("**", "")
        .replace("__", "")
        .trim()
        .to_string()
}

/// Strips a leading `1.` / `1)` header number.
fn strip_number(line: &str) -> &str {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    let rest = &line[digits..];
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map_or(line, str::trim_start)
}

/// Recognises an all-caps section header such as `USAGE EXAMPLE:`,
/// `2. COMPONENT BUILD ORDER:` or `### **CUSTOMIZATION NOTES:**`.
///
/// Bulleted lines are never headers: `- CSS: ...` is a list item whose key
/// happens to be an acronym.
///
/// Returns the label (text before the colon) and whatever follows the colon
/// on the same line.
pub fn section_header(line: &str) -> Option<(String, String)> {
    let plain = strip_markup(line);
    if plain.starts_with(['-', '*', '•']) {
        return None;
    }
    let (label, rest) = strip_number(&plain).split_once(':')?;
    let label = label.trim();

    let mut letters = 0;
    for c in label.chars() {
        if c.is_ascii_uppercase() {
            letters += 1;
        } else if !(c == ' ' || c == '/' || c == '&' || c == '-' || c == '_' || c.is_ascii_digit()) {
            return None;
        }
    }
    if letters < 2 {
        return None;
    }

    Some((label.to_string(), rest.trim().to_string()))
}

/// Reads a labelled field (`Name: Foo`, `- **Type:** ui_component`).
/// The label match is case-insensitive.
pub fn field(line: &str, label: &str) -> Option<String> {
    let plain = strip_markup(line);
    let unlisted = list_item(&plain).unwrap_or(plain.as_str());
    let (key, value) = unlisted.split_once(':')?;
    if key.trim().eq_ignore_ascii_case(label) {
        Some(value.trim().to_string())
    } else {
        None
    }
}

/// Splits a comma-separated inline list, dropping quotes and empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| unquote(s).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').trim()
}

/// First word of a field value, lowercased and unquoted. Used for enum-like
/// fields where the model may append commentary (`high (core feature)`).
pub fn keyword(value: &str) -> String {
    unquote(value.split_whitespace().next().unwrap_or(""))
        .trim_end_matches([',', '.', ';'])
        .to_lowercase()
}

const DECLARATION_KEYWORDS: [&str; 3] = ["function", "const", "class"];

fn identifiers(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|w| !w.is_empty())
}

fn is_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*')
}

fn is_identifier(word: &str) -> bool {
    word.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
}

/// Infers the component name from source code.
///
/// Preference order: `export default function X` / `export default X`,
/// then `export function|const|class X`, then the first
/// `function|const|class X`. Comment lines are ignored.
pub fn component_name(code: &str) -> Option<String> {
    let mut exported_default = None;
    let mut exported = None;
    let mut declared = None;

    for line in code.lines().filter(|l| !is_comment(l)) {
        let words: Vec<&str> = identifiers(line).collect();
        for (i, w) in words.iter().enumerate() {
            if *w == "export" {
                let mut j = i + 1;
                let is_default = words.get(j) == Some(&"default");
                if is_default {
                    j += 1;
                }
                if words.get(j) == Some(&"async") {
                    j += 1;
                }
                let name = match words.get(j) {
                    Some(k) if DECLARATION_KEYWORDS.contains(k) => words.get(j + 1),
                    Some(n) if is_default => Some(n),
                    _ => None,
                };
                if let Some(name) = name.filter(|n| is_identifier(n)) {
                    let slot = if is_default {
                        &mut exported_default
                    } else {
                        &mut exported
                    };
                    slot.get_or_insert_with(|| name.to_string());
                }
            } else if DECLARATION_KEYWORDS.contains(w)
                && let Some(name) = words.get(i + 1).filter(|n| is_identifier(n))
            {
                declared.get_or_insert_with(|| name.to_string());
            }
        }
        if exported_default.is_some() {
            break;
        }
    }

    exported_default.or(exported).or(declared)
}

/// Module paths referenced by `import … from "…"` statements, in source
/// order. A path imported twice appears twice. Multi-line import lists are
/// joined before matching; side-effect imports (`import "./x.css"`) are
/// skipped.
pub fn import_sources(code: &str) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    let mut pending: Option<String> = None;

    for line in code.lines() {
        let t = line.trim();
        let stmt = match pending.take() {
            Some(mut acc) => {
                acc.push(' ');
                acc.push_str(t);
                acc
            }
            None if t.starts_with("import ") || t.starts_with("import{") => t.to_string(),
            None => continue,
        };

        let after_keyword = stmt["import".len()..].trim_start();
        if after_keyword.starts_with(['"', '\'']) {
            continue;
        }

        if let Some(source) = from_clause(&stmt) {
            sources.push(source);
        } else if !stmt.ends_with(';') && stmt.len() < 4096 {
            pending = Some(stmt);
        }
    }

    sources
}

/// [`import_sources`] with repeats removed, first occurrence kept.
pub fn unique_import_sources(code: &str) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for source in import_sources(code) {
        if !unique.contains(&source) {
            unique.push(source);
        }
    }
    unique
}

fn from_clause(stmt: &str) -> Option<String> {
    stmt.rmatch_indices("from").find_map(|(idx, _)| {
        let before = stmt[..idx].chars().last()?;
        if !(before.is_whitespace() || before == '}') {
            return None;
        }
        let rest = stmt[idx + "from".len()..].trim_start();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let inner = &rest[1..];
        let end = inner.find(quote)?;
        let source = &inner[..end];
        (!source.is_empty()).then(|| source.to_string())
    })
}
