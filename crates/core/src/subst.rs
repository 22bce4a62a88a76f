//! Type-name substitution with context-aware boundary matching.
//!
//! Replacements apply only in type position: parameter lists, return
//! clauses, event/error signatures, and rendered getter lines. The boundary
//! rules keep identifiers that merely contain a mapped name intact.

use std::collections::BTreeMap;

/// Apply every mapped pair to the fragment. BTreeMap iteration keeps the
/// application order deterministic across runs.
pub fn substitute(fragment: &str, replace: &BTreeMap<String, String>) -> String {
    let mut text = fragment.to_string();
    for (from, to) in replace {
        text = substitute_one(&text, from, to);
    }
    text
}

/// Two rules per pair: an exact-equal fragment is replaced wholly (the bare
/// return-type case); otherwise occurrences are replaced when bounded on the
/// left by `(`, `,`, whitespace, or the fragment start, and on the right by
/// whitespace, `,`, `)`, `[`, or the fragment end.
fn substitute_one(text: &str, from: &str, to: &str) -> String {
    if text == from {
        return to.to_string();
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(found) = text[pos..].find(from) {
        let start = pos + found;
        let end = start + from.len();

        let left_ok = start == 0 || {
            let c = bytes[start - 1];
            c == b'(' || c == b',' || c.is_ascii_whitespace()
        };
        let right_ok = end == text.len() || {
            let c = bytes[end];
            c == b',' || c == b')' || c == b'[' || c.is_ascii_whitespace()
        };

        if left_ok && right_ok {
            out.push_str(&text[pos..start]);
            out.push_str(to);
            pos = end;
        } else {
            // Not a type-position occurrence; step one byte past the match
            // start so overlapping candidates are still considered.
            out.push_str(&text[pos..start + 1]);
            pos = start + 1;
        }
    }

    out.push_str(&text[pos..]);
    out
}
