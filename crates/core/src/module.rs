//! Module tasks — directive-triggered generation runs against externally
//! referenced source files. Each task gets its own throwaway generator
//! seeded from the referenced file's directives plus the task's inline
//! flags, so nothing leaks into the primary file's state.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::generate::{resolve_output, Generator};
use crate::scan::write_if_stale;
use crate::types::{DirectiveSets, GenConfig, GenError, ModuleFlags, ModuleTask, WriteOutcome};

/// Resolve a module source reference. A leading `@` resolves package-style
/// under the project's `node_modules/`; a leading `.` resolves against the
/// project root; anything else is treated as already absolute.
pub fn resolve_module_source(reference: &str, root: &Path) -> PathBuf {
    if reference.starts_with('@') {
        root.join("node_modules").join(reference)
    } else if reference.starts_with('.') {
        root.join(reference)
    } else {
        PathBuf::from(reference)
    }
}

/// Run every module task in order. Failures are reported per task and never
/// abort siblings or the owning file's own generation.
pub fn run_modules(tasks: &[ModuleTask], source_dir: &Path, config: &GenConfig, force: bool) {
    for task in tasks {
        match run_module(task, source_dir, config, force) {
            Ok(WriteOutcome::Written) => {
                info!(
                    source = task.source.as_str(),
                    output = task.output.as_str(),
                    "module interface written"
                );
            }
            Ok(WriteOutcome::Skipped) => {}
            Err(e) => {
                error!(source = task.source.as_str(), error = %e, "module generation failed");
            }
        }
    }
}

fn run_module(
    task: &ModuleTask,
    source_dir: &Path,
    config: &GenConfig,
    force: bool,
) -> Result<WriteOutcome, GenError> {
    let module_err =
        |reason: String| GenError::Module { source: task.source.clone(), reason };

    let src_path = resolve_module_source(&task.source, &config.root);
    let source = fs::read_to_string(&src_path).map_err(|e| module_err(e.to_string()))?;

    // Independent generator over the referenced file's own directives. The
    // inline flags overlay its sets, and the task's output path replaces
    // any build directive the file carries.
    let mut nested =
        Generator::from_source(source, config.marker).map_err(|e| module_err(e.to_string()))?;
    overlay_flags(&mut nested.sets, &task.flags);
    nested.sets.build_path = Some(task.output.clone());

    let text = nested.render().map_err(|e| module_err(e.to_string()))?;
    let out_path = resolve_output(source_dir, &task.output);
    write_if_stale(&src_path, &out_path, &text, force).map_err(|e| module_err(e.to_string()))
}

fn overlay_flags(sets: &mut DirectiveSets, flags: &ModuleFlags) {
    sets.remove.extend(flags.remove.iter().cloned());
    for (from, to) in &flags.replace {
        sets.replace.insert(from.clone(), to.clone());
    }
    sets.is_additions.extend(flags.is_additions.iter().cloned());
    sets.imports.extend(flags.imports.iter().cloned());
}
