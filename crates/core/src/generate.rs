//! The per-file generation pipeline: parse once, render on demand, write
//! through the skip policy, then fan out to module tasks.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::directive::{scan_directives, MarkerStyle};
use crate::extract;
use crate::module;
use crate::render;
use crate::scan::write_if_stale;
use crate::types::{
    ContractHeader, DirectiveSets, ErrorDecl, EventDecl, FunctionDecl, GenConfig, GenError,
    VariableDecl, WriteOutcome,
};

/// Owns all derived state for one input file. Directives and structure are
/// parsed exactly once during construction; every later stage reads them.
pub struct Generator {
    pub(crate) source: String,
    pub(crate) marker: MarkerStyle,
    pub(crate) sets: DirectiveSets,
    pub(crate) header: ContractHeader,
    pub(crate) functions: Vec<FunctionDecl>,
    pub(crate) events: Vec<EventDecl>,
    pub(crate) errors: Vec<ErrorDecl>,
    pub(crate) variables: Vec<VariableDecl>,
}

impl Generator {
    /// Parse source text into a ready-to-render generator. Fails only on a
    /// missing contract declaration; a missing build directive is deferred
    /// to render time.
    pub fn from_source(source: String, marker: MarkerStyle) -> Result<Self, GenError> {
        let lines: Vec<&str> = source.lines().collect();
        let sets = scan_directives(&lines, marker);
        let header = extract::extract_header(&source, &lines)?;
        let functions = extract::extract_functions(&lines);
        let events = extract::extract_events(&source);
        let errors = extract::extract_errors(&source);
        let variables = extract::extract_variables(&lines);

        debug!(
            contract = header.name.as_str(),
            functions = functions.len(),
            events = events.len(),
            errors = errors.len(),
            variables = variables.len(),
            modules = sets.modules.len(),
            "source parsed"
        );

        Ok(Self { source, marker, sets, header, functions, events, errors, variables })
    }

    pub fn from_file(path: &Path, marker: MarkerStyle) -> Result<Self, GenError> {
        let source = fs::read_to_string(path)
            .map_err(|e| GenError::Io { path: path.to_path_buf(), source: e })?;
        Self::from_source(source, marker)
    }

    /// The recorded build output path, if a usable one exists.
    pub fn output_path(&self) -> Option<&str> {
        self.sets.build_path.as_deref().filter(|p| !p.is_empty())
    }

    pub fn contract_name(&self) -> &str {
        &self.header.name
    }

    /// Assemble the interface text. [`GenError::MissingBuildDirective`] when
    /// no build directive was recorded.
    pub fn render(&self) -> Result<String, GenError> {
        render::render_interface(self)
    }
}

/// Resolve a directive path against the directory of the file that declared
/// it. Absolute paths pass through.
pub(crate) fn resolve_output(base_dir: &Path, reference: &str) -> PathBuf {
    let path = Path::new(reference);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Full pipeline for one source file: parse, render, write through the skip
/// policy, then process module tasks. Module failures are logged and
/// isolated — they never fail the owning file.
pub fn generate_file(
    path: &Path,
    config: &GenConfig,
    force: bool,
) -> Result<WriteOutcome, GenError> {
    let generator = Generator::from_file(path, config.marker)?;
    let text = generator.render()?;
    let out_rel = generator.output_path().ok_or(GenError::MissingBuildDirective)?;

    let source_dir = path.parent().unwrap_or(Path::new("."));
    let out_path = resolve_output(source_dir, out_rel);
    let outcome = write_if_stale(path, &out_path, &text, force)?;

    match outcome {
        WriteOutcome::Written => {
            info!(source = %path.display(), output = %out_path.display(), "interface written");
        }
        WriteOutcome::Skipped => {
            debug!(source = %path.display(), "output up to date — skipped");
        }
    }

    module::run_modules(&generator.sets.modules, source_dir, config, force);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_parses_everything_once() {
        let src = "\
/// @custom:interface build ./IVault.sol
contract Vault is Ownable {
    uint256 public fee;

    event FeeSet(uint256 fee);

    error NotOwner(address caller);

    function setFee(uint256 newFee) external {
    }
}";
        let g = Generator::from_source(src.to_string(), MarkerStyle::Natspec).unwrap();
        assert_eq!(g.contract_name(), "Vault");
        assert_eq!(g.output_path(), Some("./IVault.sol"));
        assert_eq!(g.functions.len(), 1);
        assert_eq!(g.events.len(), 1);
        assert_eq!(g.errors.len(), 1);
        assert_eq!(g.variables.len(), 1);
    }

    #[test]
    fn test_empty_build_path_is_unusable() {
        let src = "/// @custom:interface build\ncontract V {\n}";
        let g = Generator::from_source(src.to_string(), MarkerStyle::Natspec).unwrap();
        assert_eq!(g.output_path(), None);
        assert!(matches!(g.render(), Err(GenError::MissingBuildDirective)));
    }

    #[test]
    fn test_resolve_output() {
        let base = Path::new("/proj/contracts");
        assert_eq!(resolve_output(base, "./IV.sol"), PathBuf::from("/proj/contracts/./IV.sol"));
        assert_eq!(resolve_output(base, "/abs/IV.sol"), PathBuf::from("/abs/IV.sol"));
    }
}
