//! Directive grammar — tokenizes marker comment lines into typed directives.
//!
//! Two front ends share this grammar: the natspec style
//! (`/// @custom:interface …`) and the legacy bang style (`// !interface …`).
//! Both strip down to the same remainder text, classified against an ordered
//! list of sub-grammars.

use regex::Regex;
use tracing::warn;

use crate::types::{Directive, DirectiveSets, ModuleFlags, ModuleTask};

// ---------------------------------------------------------------------------
// Marker front ends
// ---------------------------------------------------------------------------

/// Which comment marker carries directives in a given project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// `/// @custom:interface <directive>`
    Natspec,
    /// `// !interface <directive>` (also accepted behind `///`)
    Bang,
}

impl MarkerStyle {
    /// If `line` is a directive line for this marker, return the remainder
    /// after the marker token.
    pub fn strip<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim_start();
        match self {
            Self::Natspec => {
                let rest = trimmed.strip_prefix("///")?;
                rest.trim_start().strip_prefix("@custom:interface").map(|r| r.trim())
            }
            Self::Bang => {
                let rest =
                    trimmed.strip_prefix("///").or_else(|| trimmed.strip_prefix("//"))?;
                rest.trim_start().strip_prefix("!interface").map(|r| r.trim())
            }
        }
    }

    /// Literal substring identifying an eligible file during discovery.
    pub fn build_token(&self) -> &'static str {
        match self {
            Self::Natspec => "@custom:interface build",
            Self::Bang => "!interface build",
        }
    }

    /// Marker name as written in `.solgen.toml`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "natspec" => Some(Self::Natspec),
            "bang" => Some(Self::Bang),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Directive pass
// ---------------------------------------------------------------------------

/// Run the directive pass over the full line array, folding every marker
/// line into one [`DirectiveSets`].
pub fn scan_directives(lines: &[&str], marker: MarkerStyle) -> DirectiveSets {
    let mut sets = DirectiveSets::default();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(text) = marker.strip(line) {
            sets.apply(parse_directive(text, idx + 1));
        }
    }
    sets
}

/// Classify one directive remainder against the sub-grammars, in priority
/// order: build, module, copyright, import, replace, remove, exclude,
/// include, getter, is. First match wins.
///
/// Unrecognized content is not an error — it degrades to a `Build` directive
/// carrying the raw remainder. A malformed `build` (missing path) surfaces
/// later as "no build directive found" at generation time.
pub fn parse_directive(text: &str, line: usize) -> Directive {
    let text = text.trim();

    if let Some(rest) = keyword(text, "build") {
        return Directive::Build(parse_path(rest));
    }
    if let Some(rest) = keyword(text, "module") {
        if let Some(task) = parse_module(rest) {
            return Directive::Module(task);
        }
    }
    if let Some(rest) = keyword(text, "copyright") {
        if let Some(quoted) = parse_quoted(rest) {
            return Directive::Copyright(quoted);
        }
    }
    if let Some(rest) = keyword(text, "import") {
        let path = parse_path(rest);
        if !path.is_empty() {
            return Directive::Import(path);
        }
    }
    if let Some(rest) = keyword(text, "replace") {
        let re = Regex::new(r"^(\w+)\s+with\s+(\w+)$").unwrap();
        if let Some(cap) = re.captures(rest.trim()) {
            return Directive::Replace { from: cap[1].to_string(), to: cap[2].to_string() };
        }
    }
    if let Some(rest) = keyword(text, "remove") {
        if let Some(names) = parse_names(rest) {
            return Directive::Remove(names);
        }
    }
    if let Some(rest) = keyword(text, "exclude") {
        if let Some(names) = parse_names(rest) {
            return Directive::Exclude(names);
        }
    }
    if let Some(rest) = keyword(text, "include") {
        if let Some(names) = parse_names(rest) {
            return Directive::Include(names);
        }
    }
    if let Some(rest) = keyword(text, "getter") {
        if let Some(names) = parse_names(rest) {
            return Directive::Getter(names);
        }
    }
    if let Some(rest) = keyword(text, "is") {
        if let Some(names) = parse_comma_list(rest) {
            return Directive::Is(names);
        }
    }

    warn!(line, text, "unrecognized directive — treating as build path");
    Directive::Build(text.to_string())
}

// ---------------------------------------------------------------------------
// Sub-grammar helpers
// ---------------------------------------------------------------------------

/// Match a leading keyword followed by end-of-text or whitespace.
fn keyword<'a>(text: &'a str, kw: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(kw)?;
    if rest.is_empty() {
        Some(rest)
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// A path payload: double-quoted (required when it contains spaces) or the
/// first bare token, with any trailing semicolon stripped.
fn parse_path(text: &str) -> String {
    let t = text.trim();
    if let Some(rest) = t.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            return rest[..end].to_string();
        }
    }
    t.split_whitespace().next().unwrap_or("").trim_end_matches(';').to_string()
}

/// The first double-quoted string in the text, or None.
fn parse_quoted(text: &str) -> Option<String> {
    let re = Regex::new(r#""([^"]*)""#).unwrap();
    re.captures(text).map(|cap| cap[1].to_string())
}

/// One or more whitespace-separated names.
fn parse_names(text: &str) -> Option<Vec<String>> {
    let names: Vec<String> = text.split_whitespace().map(|s| s.to_string()).collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// One or more comma-separated names, trimmed, order and duplicates kept.
fn parse_comma_list(text: &str) -> Option<Vec<String>> {
    let names: Vec<String> =
        text.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// `module "<src>" to "<dst>" [flags]`
fn parse_module(text: &str) -> Option<ModuleTask> {
    let re = Regex::new(r#"^"([^"]+)"\s+to\s+"([^"]+)"\s*(.*)$"#).unwrap();
    let cap = re.captures(text.trim())?;
    Some(ModuleTask {
        source: cap[1].to_string(),
        output: cap[2].to_string(),
        flags: parse_module_flags(&cap[3]),
    })
}

/// Parse the free-text flag tail of a `module` directive. Supported flags:
/// `--remove <name>`, `--replace <old> with <new>`, `--is <comma list>`,
/// `--import "<path>"|<path>`. Repeated flags all apply.
pub fn parse_module_flags(tail: &str) -> ModuleFlags {
    let mut flags = ModuleFlags::default();
    let tokens = tokenize_flags(tail);
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i].as_str() {
            "--remove" => {
                if let Some(name) = tokens.get(i + 1) {
                    flags.remove.push(name.clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--replace" => {
                // --replace <old> with <new>
                if tokens.get(i + 2).map(|t| t.as_str()) == Some("with") {
                    if let (Some(old), Some(new)) = (tokens.get(i + 1), tokens.get(i + 3)) {
                        flags.replace.push((old.clone(), new.clone()));
                        i += 4;
                        continue;
                    }
                }
                warn!(tail, "malformed --replace flag in module directive");
                i += 1;
            }
            "--is" => {
                // Comma list may span tokens: --is A, B, C
                let mut list = String::new();
                i += 1;
                while i < tokens.len() && !tokens[i].starts_with("--") {
                    list.push_str(&tokens[i]);
                    list.push(' ');
                    i += 1;
                }
                flags.is_additions.extend(
                    list.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                );
            }
            "--import" => {
                if let Some(path) = tokens.get(i + 1) {
                    flags.imports.push(path.trim_end_matches(';').to_string());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            other => {
                warn!(flag = other, "unknown module flag — skipping");
                i += 1;
            }
        }
    }
    flags
}

/// Whitespace tokenizer that keeps double-quoted segments whole (quotes
/// stripped).
fn tokenize_flags(tail: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = tail.trim();
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('"') {
            match body.find('"') {
                Some(end) => {
                    tokens.push(body[..end].to_string());
                    rest = body[end + 1..].trim_start();
                }
                None => {
                    tokens.push(body.to_string());
                    break;
                }
            }
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            tokens.push(rest[..end].to_string());
            rest = rest[end..].trim_start();
        }
    }
    tokens
}
