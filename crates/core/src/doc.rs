//! Doc-comment association — walks backward from a declaration to capture
//! the contiguous documentation block above it.
//!
//! Two styles survive into the generated output: chains of `///` lines and
//! `/* … */` blocks. Directive lines are transparent to the scan.

use crate::directive::MarkerStyle;

/// Collect the documentation block immediately preceding the declaration on
/// 1-based `decl_line`. Returns the lines trimmed, in source order; empty
/// when no block exists.
///
/// Scan rules, walking upward from the line directly above the declaration:
/// - directive-marker lines are skipped without breaking the scan;
/// - a `*/` line activates block mode only if it is the first non-directive
///   line encountered;
/// - inside block mode, `*` continuation lines and blanks are captured, the
///   `/*` opener is captured and ends the scan, anything else ends the scan
///   without being captured;
/// - outside block mode, `///` lines are captured, blanks and plain `//`
///   comments are skipped, and any other content ends the scan.
pub fn collect_doc_block(lines: &[&str], decl_line: usize, marker: MarkerStyle) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();
    if decl_line < 2 || lines.is_empty() {
        return collected;
    }

    let mut in_block = false;
    let mut seen_content = false;
    let mut idx = (decl_line - 2).min(lines.len() - 1);

    loop {
        let trimmed = lines[idx].trim();

        if marker.strip(lines[idx]).is_some() {
            // transparent
        } else if in_block {
            if trimmed.starts_with("/*") {
                collected.push(trimmed.to_string());
                break;
            } else if trimmed.starts_with('*') || trimmed.is_empty() {
                collected.push(trimmed.to_string());
            } else {
                break;
            }
        } else if !seen_content && trimmed.contains("*/") {
            in_block = true;
            seen_content = true;
            collected.push(trimmed.to_string());
            if trimmed.starts_with("/*") {
                // opener and closer on one line
                break;
            }
        } else if trimmed.starts_with("///") {
            seen_content = true;
            collected.push(trimmed.to_string());
        } else if trimmed.is_empty() || trimmed.starts_with("//") {
            seen_content = true;
        } else {
            break;
        }

        if idx == 0 {
            break;
        }
        idx -= 1;
    }

    collected.reverse();
    collected
}
