use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::directive::MarkerStyle;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default extension for eligible source files.
pub const SOURCE_EXTENSION: &str = "sol";

/// Fixed boilerplate echoed at the top of every generated interface.
/// Not derived from the input file.
pub const INTERFACE_PREAMBLE: &str = "// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\n";

/// Indentation for members inside the interface body.
pub const MEMBER_INDENT: &str = "    ";

// ---------------------------------------------------------------------------
// Generation configuration — loaded from .solgen.toml or defaults
// ---------------------------------------------------------------------------

/// Runtime configuration for discovery and generation.
#[derive(Clone)]
pub struct GenConfig {
    pub root: PathBuf,
    /// Directories to scan for eligible sources (relative to root). Empty = root itself.
    pub source_dirs: Vec<String>,
    /// Directory names to skip during the walk.
    pub skip_dirs: HashSet<String>,
    /// Source file extension (without the dot).
    pub extension: String,
    /// Which directive marker front end this project uses.
    pub marker: MarkerStyle,
}

impl GenConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            source_dirs: Vec::new(),
            skip_dirs: [".git", "node_modules", "artifacts", "cache", "out", "broadcast"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extension: SOURCE_EXTENSION.to_string(),
            marker: MarkerStyle::Natspec,
        }
    }
}

impl Default for GenConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// One parsed directive line.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Output path for the primary pipeline. Also the permissive fallback
    /// for unrecognized directive text.
    Build(String),
    /// Copyright comment for the generated file; last occurrence wins.
    Copyright(String),
    /// An import line to emit verbatim (path only), in encounter order.
    Import(String),
    /// Rename a type everywhere it appears in type position.
    Replace { from: String, to: String },
    /// Base contracts to drop from the inheritance clause.
    Remove(Vec<String>),
    /// Base names to append to the inheritance clause, in order.
    Is(Vec<String>),
    /// Members to force out of the output.
    Exclude(Vec<String>),
    /// Functions to force into the output regardless of visibility.
    Include(Vec<String>),
    /// Variables to force a getter for.
    Getter(Vec<String>),
    /// Generate a second interface from an external source file.
    Module(ModuleTask),
}

/// Inline flags carried by a `module` directive. All repeated flags apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleFlags {
    pub remove: Vec<String>,
    pub replace: Vec<(String, String)>,
    pub is_additions: Vec<String>,
    pub imports: Vec<String>,
}

/// One generation run against an externally referenced source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleTask {
    pub source: String,
    pub output: String,
    pub flags: ModuleFlags,
}

/// Aggregated directive state for one input file. Populated once while the
/// generator is constructed and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DirectiveSets {
    pub build_path: Option<String>,
    pub copyright: Option<String>,
    pub imports: Vec<String>,
    /// from -> to, last write wins. BTreeMap so substitution order is
    /// deterministic and repeated runs produce identical bytes.
    pub replace: BTreeMap<String, String>,
    pub remove: HashSet<String>,
    pub exclude: HashSet<String>,
    pub include: HashSet<String>,
    pub getter: HashSet<String>,
    /// Appended inheritance entries, in directive order, duplicates kept.
    pub is_additions: Vec<String>,
    pub modules: Vec<ModuleTask>,
}

impl DirectiveSets {
    /// Fold one directive into the aggregate state.
    pub fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Build(path) => self.build_path = Some(path),
            Directive::Copyright(text) => self.copyright = Some(text),
            Directive::Import(path) => self.imports.push(path),
            Directive::Replace { from, to } => {
                self.replace.insert(from, to);
            }
            Directive::Remove(names) => self.remove.extend(names),
            Directive::Is(names) => self.is_additions.extend(names),
            Directive::Exclude(names) => self.exclude.extend(names),
            Directive::Include(names) => self.include.extend(names),
            Directive::Getter(names) => self.getter.extend(names),
            Directive::Module(task) => self.modules.push(task),
        }
    }
}

// ---------------------------------------------------------------------------
// Declaration records
// ---------------------------------------------------------------------------

/// Function visibility. Solidity's default for functions is `public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

impl Visibility {
    /// Externally reachable — the two levels an interface can expose.
    pub fn is_exposed(self) -> bool {
        matches!(self, Self::Public | Self::External)
    }
}

/// State mutability. Nonpayable is Solidity's unwritten default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Nonpayable,
    View,
    Pure,
    Payable,
}

impl Mutability {
    /// Keyword to render after `external`, or None for the default.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Nonpayable => None,
            Self::View => Some("view"),
            Self::Pure => Some("pure"),
            Self::Payable => Some("payable"),
        }
    }
}

/// A function header pulled from the implementation text.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    /// Raw parameter list text, exactly as written (inner text of the parens).
    pub params: String,
    pub visibility: Visibility,
    pub mutability: Mutability,
    /// Inner text of the `returns (…)` clause, if present.
    pub returns: Option<String>,
    /// 1-based line of the `function` keyword.
    pub line: usize,
}

/// An `event Name(…);` declaration.
#[derive(Debug, Clone)]
pub struct EventDecl {
    pub name: String,
    /// Full signature text, `event` keyword through `;`.
    pub signature: String,
    pub line: usize,
}

/// An `error Name(…);` declaration.
#[derive(Debug, Clone)]
pub struct ErrorDecl {
    pub name: String,
    pub signature: String,
    pub line: usize,
}

/// The type of a state variable the extractor recognizes.
#[derive(Debug, Clone, PartialEq)]
pub enum VarType {
    /// A primitive scalar (uint256, address, bool, bytes32, string, …).
    Scalar(String),
    /// A single-level mapping from a scalar key to an identifier (possibly
    /// array-suffixed) value.
    Mapping { key: String, value: String },
}

/// A state variable declaration eligible for getter synthesis.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub ty: VarType,
    pub visibility: Visibility,
    /// `constant` or `immutable` — synthesized getters become `pure`.
    pub constant: bool,
    pub line: usize,
}

/// The contract header: name plus raw inheritance list.
#[derive(Debug, Clone)]
pub struct ContractHeader {
    pub name: String,
    pub bases: Vec<String>,
    /// 1-based line of the `contract <Name>` text, anchoring doc lookup.
    pub line: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while generating one interface.
#[derive(Debug)]
pub enum GenError {
    /// No `build` directive was present when generation was invoked.
    MissingBuildDirective,
    /// No contract declaration matched anywhere in the input text.
    ContractNotFound,
    /// A `module` directive's source could not be resolved or processed.
    /// Isolated per task; never aborts siblings or the primary pipeline.
    Module { source: String, reason: String },
    /// Reading the input or writing the output failed.
    Io { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for GenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBuildDirective => write!(f, "no build directive found"),
            Self::ContractNotFound => write!(f, "contract declaration not found"),
            Self::Module { source, reason } => {
                write!(f, "module '{source}' failed: {reason}")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Batch results
// ---------------------------------------------------------------------------

/// Whether the write collaborator actually touched the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Output already newer than the source and no force flag.
    Skipped,
}

/// Per-run totals for batch generation.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BatchSummary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}
