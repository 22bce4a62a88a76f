//! solgen — directive-driven Solidity interface generation.
//!
//! This crate derives a minimal interface file from a richer implementation
//! contract, driven entirely by directives embedded in comments. It is a
//! source-to-source generator: signatures only, documentation comments
//! preserved, inheritance and import edges rewritten as directed. Extraction
//! is heuristic (line scanning plus brace counting), not a grammar-aware
//! parser — unusual formatting produces false negatives, never errors.
//!
//! # Modules
//!
//! - [`directive`] — marker front ends and the directive grammar
//! - [`doc`] — doc-comment association (backward scan, two comment styles)
//! - [`extract`] — heuristic structural extraction
//! - [`subst`] — type-position name substitution
//! - [`render`] — inclusion policy, inheritance rewriting, assembly
//! - [`generate`] — the per-file generator pipeline
//! - [`module`] — module tasks against externally referenced files
//! - [`scan`] — discovery, skip policy, batch orchestration
//! - [`types`] — records, directive sets, configuration, errors

pub mod directive;
pub mod doc;
pub mod extract;
pub mod generate;
pub mod module;
pub mod render;
pub mod scan;
pub mod subst;
pub mod types;

use std::path::Path;

use tracing::{debug, warn};

pub use directive::MarkerStyle;
pub use generate::{generate_file, Generator};
pub use types::{BatchSummary, GenConfig, GenError};

// ---------------------------------------------------------------------------
// .solgen.toml config loading
// ---------------------------------------------------------------------------

/// Known keys in `.solgen.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &["source_dirs", "skip_dirs", "extension", "marker"];

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Load configuration from `.solgen.toml` in the given project root.
///
/// Returns a [`GenConfig`] with defaults merged with any overrides from the
/// config file. A missing or unparsable file yields defaults (with a warning
/// in the unparsable case). Unknown keys warn with a typo suggestion.
pub fn load_solgen_config(project_root: &Path) -> GenConfig {
    let mut config = GenConfig::new(project_root.to_path_buf());
    let config_path = project_root.join(".solgen.toml");

    if config_path.exists() {
        debug!("Loading .solgen.toml");
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(table) = content.parse::<toml::Table>() {
                for key in table.keys() {
                    if !KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
                        let suggestion = KNOWN_CONFIG_KEYS
                            .iter()
                            .min_by_key(|k| edit_distance(key, k))
                            .unwrap();
                        let dist = edit_distance(key, suggestion);
                        if dist <= 3 {
                            warn!(
                                key = key.as_str(),
                                suggestion = *suggestion,
                                "Unknown key in .solgen.toml — did you mean '{suggestion}'?"
                            );
                        } else {
                            warn!(
                                key = key.as_str(),
                                "Unknown key in .solgen.toml (known keys: {})",
                                KNOWN_CONFIG_KEYS.join(", ")
                            );
                        }
                    }
                }

                // source_dirs
                if let Some(dirs) = table.get("source_dirs").and_then(|v| v.as_array()) {
                    config.source_dirs =
                        dirs.iter().filter_map(|v| v.as_str().map(|s| s.to_string())).collect();
                }

                // skip_dirs — merge with defaults
                if let Some(dirs) = table.get("skip_dirs").and_then(|v| v.as_array()) {
                    for d in dirs {
                        if let Some(s) = d.as_str() {
                            config.skip_dirs.insert(s.to_string());
                        }
                    }
                }

                // extension
                if let Some(ext) = table.get("extension").and_then(|v| v.as_str()) {
                    config.extension = ext.trim_start_matches('.').to_string();
                }

                // marker
                if let Some(name) = table.get("marker").and_then(|v| v.as_str()) {
                    match MarkerStyle::from_name(name) {
                        Some(marker) => config.marker = marker,
                        None => warn!(
                            marker = name,
                            "Unknown marker style in .solgen.toml — expected 'natspec' or 'bang'"
                        ),
                    }
                }
            } else {
                warn!("Failed to parse .solgen.toml");
            }
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_solgen_config(dir.path());
        assert_eq!(config.extension, "sol");
        assert_eq!(config.marker, MarkerStyle::Natspec);
        assert!(config.source_dirs.is_empty());
        assert!(config.skip_dirs.contains("node_modules"));
    }

    #[test]
    fn test_config_overrides_merge() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".solgen.toml"),
            "source_dirs = [\"contracts\", \"src\"]\nskip_dirs = [\"mocks\"]\nextension = \".solx\"\nmarker = \"bang\"\n",
        )
        .unwrap();

        let config = load_solgen_config(dir.path());
        assert_eq!(config.source_dirs, vec!["contracts", "src"]);
        assert!(config.skip_dirs.contains("mocks"), "custom skip dirs merge in");
        assert!(config.skip_dirs.contains("node_modules"), "defaults survive the merge");
        assert_eq!(config.extension, "solx", "leading dot stripped");
        assert_eq!(config.marker, MarkerStyle::Bang);
    }

    #[test]
    fn test_invalid_marker_keeps_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".solgen.toml"), "marker = \"emoji\"\n").unwrap();
        let config = load_solgen_config(dir.path());
        assert_eq!(config.marker, MarkerStyle::Natspec);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("marker", "marker"), 0);
        assert_eq!(edit_distance("markr", "marker"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
    }
}
