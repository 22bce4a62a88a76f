//! Discovery, the write-skip policy, and sequential batch orchestration.
//!
//! Batch processing is deliberately single-threaded: one file at a time,
//! each with its own generator, failures caught and counted per file.

use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::generate::generate_file;
use crate::types::{BatchSummary, GenConfig, GenError, WriteOutcome};

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Enumerate eligible source files under the configured source dirs: files
/// with the configured extension whose raw text contains the marker's build
/// token. Results are sorted for a stable batch order.
pub fn discover(config: &GenConfig) -> Vec<PathBuf> {
    let source_dirs: Vec<String> = if config.source_dirs.is_empty() {
        vec![".".to_string()]
    } else {
        config.source_dirs.clone()
    };
    let token = config.marker.build_token();

    let mut eligible = Vec::new();
    for dir in &source_dirs {
        let base = config.root.join(dir);
        if !base.exists() {
            warn!(dir = dir.as_str(), "source dir not found — skipping");
            continue;
        }

        let skip = config.skip_dirs.clone();
        let walker = WalkBuilder::new(&base)
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .filter_entry(move |entry| {
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    let name = entry.file_name().to_string_lossy();
                    return !skip.contains(name.as_ref());
                }
                true
            })
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(config.extension.as_str()) {
                continue;
            }
            match fs::read_to_string(path) {
                Ok(content) if content.contains(token) => eligible.push(path.to_path_buf()),
                _ => {}
            }
        }
    }

    eligible.sort();
    debug!(count = eligible.len(), "discovery complete");
    eligible
}

// ---------------------------------------------------------------------------
// Skip policy + write
// ---------------------------------------------------------------------------

/// Write the output unless it is already strictly newer than the source.
/// The mtime comparison is a plain filesystem read, not a lock. Parent
/// directories are created as needed.
pub fn write_if_stale(
    source: &Path,
    output: &Path,
    text: &str,
    force: bool,
) -> Result<WriteOutcome, GenError> {
    if !force {
        let source_mtime = fs::metadata(source).and_then(|m| m.modified());
        let output_mtime = fs::metadata(output).and_then(|m| m.modified());
        if let (Ok(src), Ok(out)) = (source_mtime, output_mtime) {
            if out > src {
                return Ok(WriteOutcome::Skipped);
            }
        }
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| GenError::Io { path: parent.to_path_buf(), source: e })?;
    }
    fs::write(output, text)
        .map_err(|e| GenError::Io { path: output.to_path_buf(), source: e })?;
    Ok(WriteOutcome::Written)
}

// ---------------------------------------------------------------------------
// Batch orchestration
// ---------------------------------------------------------------------------

/// Generate every file in order. One file's failure is logged and counted
/// and the rest of the batch still runs.
pub fn run_batch(files: &[PathBuf], config: &GenConfig, force: bool) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for file in files {
        match generate_file(file, config, force) {
            Ok(WriteOutcome::Written) => summary.generated += 1,
            Ok(WriteOutcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                summary.failed += 1;
                error!(file = %file.display(), error = %e, "generation failed");
            }
        }
    }

    info!(
        generated = summary.generated,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch complete"
    );
    summary
}
