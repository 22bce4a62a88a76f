//! Structural extraction — pulls contract/function/event/error/variable
//! records out of raw source text.
//!
//! This is deliberately not a grammar-aware parser: line classification plus
//! brace-depth tracking, with permissive regexes over aggregated header
//! text. Unusual formatting produces false negatives, not errors. The
//! records-out interface keeps the heuristics swappable without touching
//! directive handling or rendering.

use regex::Regex;
use tracing::debug;

use crate::types::{
    ContractHeader, ErrorDecl, EventDecl, FunctionDecl, GenError, Mutability, VarType,
    VariableDecl, Visibility,
};

/// Scalar type vocabulary the variable matcher recognizes.
const SCALAR_TYPES: &str = r"uint\d*|int\d*|address|bool|bytes\d*|string";

// ---------------------------------------------------------------------------
// Contract header
// ---------------------------------------------------------------------------

/// Find the contract declaration: `[abstract] contract <Name> [is <bases>] {`.
/// First match anywhere in the text wins; the doc anchor line is located by
/// searching for the literal `contract <Name>` substring.
pub fn extract_header(text: &str, lines: &[&str]) -> Result<ContractHeader, GenError> {
    let re = Regex::new(r"(?:abstract\s+)?\bcontract\s+(\w+)\s*(?:is\s+([^{]+?))?\s*\{").unwrap();
    let cap = re.captures(text).ok_or(GenError::ContractNotFound)?;

    let name = cap[1].to_string();
    let bases: Vec<String> = cap
        .get(2)
        .map(|m| {
            m.as_str().split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
        })
        .unwrap_or_default();

    let anchor = format!("contract {name}");
    let line = lines.iter().position(|l| l.contains(&anchor)).map(|i| i + 1).unwrap_or(1);

    Ok(ContractHeader { name, bases, line })
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// Scan for function headers. A line starting with `function ` begins
/// multi-line aggregation: lines are space-joined until the brace-depth
/// counter first exceeds zero (body reached), a `;` appears at depth zero
/// (body-less declaration), or the input ends. One permissive pattern over
/// the aggregate extracts the pieces; aggregates it cannot match are
/// dropped.
pub fn extract_functions(lines: &[&str]) -> Vec<FunctionDecl> {
    let fn_re = Regex::new(r"^function\s+(\w+)\s*\(([^)]*)\)(.*)$").unwrap();
    let vis_re = Regex::new(r"\b(public|external|internal|private)\b").unwrap();
    let mut_re = Regex::new(r"\b(payable|view|pure)\b").unwrap();
    let ret_re = Regex::new(r"returns\s*\(([^)]*)\)").unwrap();

    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !lines[i].trim().starts_with("function ") {
            i += 1;
            continue;
        }

        let start = i;
        let mut aggregate = String::new();
        let mut depth: i32 = 0;
        let mut terminated = false;

        'aggregate: while i < lines.len() {
            let piece = lines[i].trim();
            if !aggregate.is_empty() {
                aggregate.push(' ');
            }
            aggregate.push_str(piece);

            for ch in piece.chars() {
                match ch {
                    '{' => {
                        depth += 1;
                        if depth > 0 {
                            terminated = true;
                            break 'aggregate;
                        }
                    }
                    '}' => depth -= 1,
                    ';' if depth == 0 => {
                        terminated = true;
                        break 'aggregate;
                    }
                    _ => {}
                }
            }
            i += 1;
        }

        if !terminated {
            debug!(line = start + 1, "unterminated function header — dropped");
            break;
        }

        // Only the header text participates in the match.
        let header = aggregate.split('{').next().unwrap_or(&aggregate);
        match fn_re.captures(header) {
            Some(cap) => {
                let attrs = cap.get(3).map(|m| m.as_str()).unwrap_or("");
                let visibility = match vis_re.captures(attrs).map(|c| c[1].to_string()) {
                    Some(v) if v == "external" => Visibility::External,
                    Some(v) if v == "internal" => Visibility::Internal,
                    Some(v) if v == "private" => Visibility::Private,
                    // explicit public, or omitted
                    _ => Visibility::Public,
                };
                let mutability = match mut_re.captures(attrs).map(|c| c[1].to_string()) {
                    Some(m) if m == "view" => Mutability::View,
                    Some(m) if m == "pure" => Mutability::Pure,
                    Some(m) if m == "payable" => Mutability::Payable,
                    _ => Mutability::Nonpayable,
                };
                let returns = ret_re.captures(attrs).map(|c| c[1].trim().to_string());

                out.push(FunctionDecl {
                    name: cap[1].to_string(),
                    params: cap[2].trim().to_string(),
                    visibility,
                    mutability,
                    returns,
                    line: start + 1,
                });
            }
            None => {
                // Lossy by design: unmatched aggregates vanish from the output.
                debug!(line = start + 1, header, "function header did not match — dropped");
            }
        }

        i += 1;
    }

    out
}

// ---------------------------------------------------------------------------
// Events and errors
// ---------------------------------------------------------------------------

/// Single-line scan for `event Name(…)…;` declarations across the whole
/// text. Line numbers are derived from the newline count up to the match.
pub fn extract_events(text: &str) -> Vec<EventDecl> {
    let re = Regex::new(r"\bevent\s+(\w+)\s*\(([^)\n]*)\)[^;\n]*;").unwrap();
    re.captures_iter(text)
        .map(|cap| {
            let m = cap.get(0).expect("capture 0 always present");
            EventDecl {
                name: cap[1].to_string(),
                signature: m.as_str().to_string(),
                line: line_of_offset(text, m.start()),
            }
        })
        .collect()
}

/// Single-line scan for `error Name(…);` declarations.
pub fn extract_errors(text: &str) -> Vec<ErrorDecl> {
    let re = Regex::new(r"\berror\s+(\w+)\s*\(([^)\n]*)\)[ \t]*;").unwrap();
    re.captures_iter(text)
        .map(|cap| {
            let m = cap.get(0).expect("capture 0 always present");
            ErrorDecl {
                name: cap[1].to_string(),
                signature: m.as_str().to_string(),
                line: line_of_offset(text, m.start()),
            }
        })
        .collect()
}

fn line_of_offset(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

// ---------------------------------------------------------------------------
// State variables
// ---------------------------------------------------------------------------

/// Scan for state variable declarations over a constrained type vocabulary:
/// primitive scalars and single-level mappings. Scalar matches on lines
/// containing the function keyword or a parenthesis are discarded (the
/// parameter-list lookalike heuristic); mapping matches are discarded only
/// for the function keyword, since mapping syntax itself uses parens.
/// Arrays, structs, and user-typed variables are invisible.
pub fn extract_variables(lines: &[&str]) -> Vec<VariableDecl> {
    let scalar_re = Regex::new(&format!(
        r"^({SCALAR_TYPES})\s+(?:(public|internal|private)\s+)?(?:(constant|immutable)\s+)?(\w+)\s*[=;]"
    ))
    .unwrap();
    let map_re = Regex::new(&format!(
        r"^mapping\s*\(\s*({SCALAR_TYPES})\s*=>\s*(\w+(?:\[\])?)\s*\)\s+(?:(public|internal|private)\s+)?(\w+)\s*[=;]"
    ))
    .unwrap();

    let mut out = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.contains("function") {
            continue;
        }

        if let Some(cap) = map_re.captures(trimmed) {
            out.push(VariableDecl {
                name: cap[4].to_string(),
                ty: VarType::Mapping { key: cap[1].to_string(), value: cap[2].to_string() },
                visibility: parse_var_visibility(cap.get(3).map(|m| m.as_str())),
                constant: false,
                line: idx + 1,
            });
            continue;
        }

        if trimmed.contains('(') {
            continue;
        }

        if let Some(cap) = scalar_re.captures(trimmed) {
            out.push(VariableDecl {
                name: cap[4].to_string(),
                ty: VarType::Scalar(cap[1].to_string()),
                visibility: parse_var_visibility(cap.get(2).map(|m| m.as_str())),
                constant: cap.get(3).is_some(),
                line: idx + 1,
            });
        }
    }

    out
}

/// Solidity's default visibility for state variables is `internal`.
fn parse_var_visibility(token: Option<&str>) -> Visibility {
    match token {
        Some("public") => Visibility::Public,
        Some("private") => Visibility::Private,
        _ => Visibility::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<&str> {
        src.lines().collect()
    }

    #[test]
    fn test_header_with_bases() {
        let src = "pragma solidity ^0.8.0;\n\nabstract contract Vault is Ownable, ReentrancyGuard {\n}";
        let h = extract_header(src, &lines(src)).unwrap();
        assert_eq!(h.name, "Vault");
        assert_eq!(h.bases, vec!["Ownable", "ReentrancyGuard"]);
        assert_eq!(h.line, 3);
    }

    #[test]
    fn test_header_without_bases() {
        let src = "contract Token {\n}";
        let h = extract_header(src, &lines(src)).unwrap();
        assert_eq!(h.name, "Token");
        assert!(h.bases.is_empty());
    }

    #[test]
    fn test_header_missing_is_fatal() {
        let src = "library SafeMath {\n}";
        assert!(matches!(extract_header(src, &lines(src)), Err(GenError::ContractNotFound)));
    }

    #[test]
    fn test_multiline_header_bases() {
        let src = "contract Vault is\n    Ownable,\n    Pausable\n{\n}";
        let h = extract_header(src, &lines(src)).unwrap();
        assert_eq!(h.bases, vec!["Ownable", "Pausable"]);
    }

    #[test]
    fn test_single_line_function() {
        let src = "function deposit(uint256 amount) external payable returns (uint256) {";
        let fns = extract_functions(&lines(src));
        assert_eq!(fns.len(), 1);
        assert_eq!(fns[0].name, "deposit");
        assert_eq!(fns[0].params, "uint256 amount");
        assert_eq!(fns[0].visibility, Visibility::External);
        assert_eq!(fns[0].mutability, Mutability::Payable);
        assert_eq!(fns[0].returns.as_deref(), Some("uint256"));
    }

    #[test]
    fn test_multiline_function_header() {
        let src = "\
function withdraw(
    uint256 amount,
    address to
)
    external
    returns (bool success)
{
    // body
}";
        let fns = extract_functions(&lines(src));
        assert_eq!(fns.len(), 1, "multi-line header should aggregate, got: {fns:?}");
        assert_eq!(fns[0].name, "withdraw");
        assert_eq!(fns[0].params, "uint256 amount, address to");
        assert_eq!(fns[0].returns.as_deref(), Some("bool success"));
        assert_eq!(fns[0].line, 1);
    }

    #[test]
    fn test_visibility_defaults_to_public() {
        let src = "function helper() view returns (uint256) {";
        let fns = extract_functions(&lines(src));
        assert_eq!(fns[0].visibility, Visibility::Public);
        assert_eq!(fns[0].mutability, Mutability::View);
    }

    #[test]
    fn test_bodyless_declaration_terminates_on_semicolon() {
        let src = "function decimals() external view returns (uint8);\nfunction name() external view returns (string memory);";
        let fns = extract_functions(&lines(src));
        assert_eq!(fns.len(), 2);
        assert_eq!(fns[1].name, "name");
    }

    #[test]
    fn test_events_and_errors() {
        let src = "\
contract C {
    event Transfer(address indexed from, address indexed to, uint256 value);
    event Ping() anonymous;
    error InsufficientBalance(uint256 requested, uint256 available);
}";
        let events = extract_events(src);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Transfer");
        assert_eq!(events[0].line, 2);
        assert!(events[1].signature.contains("anonymous"));

        let errors = extract_errors(src);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].name, "InsufficientBalance");
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn test_scalar_variables() {
        let src = "\
uint256 public totalSupply;
address internal owner;
uint256 public constant MAX = 1000;
bytes32 merkleRoot = bytes32_zero;
string private name_;";
        let vars = extract_variables(&lines(src));
        assert_eq!(vars.len(), 5, "got: {vars:?}");
        assert_eq!(vars[0].name, "totalSupply");
        assert_eq!(vars[0].visibility, Visibility::Public);
        assert_eq!(vars[1].visibility, Visibility::Internal);
        assert!(vars[2].constant);
        assert_eq!(vars[3].visibility, Visibility::Internal);
    }

    #[test]
    fn test_mapping_variable() {
        let src = "mapping(address => uint256) public balances;";
        let vars = extract_variables(&lines(src));
        assert_eq!(vars.len(), 1);
        assert_eq!(
            vars[0].ty,
            VarType::Mapping { key: "address".to_string(), value: "uint256".to_string() }
        );
    }

    #[test]
    fn test_parameter_lookalikes_excluded() {
        let src = "\
function setFee(uint256 newFee) external {
uint256 memory x = compute(a);
}";
        let vars = extract_variables(&lines(src));
        assert!(vars.is_empty(), "parameter/call lines must not match, got: {vars:?}");
    }

    #[test]
    fn test_unsupported_types_invisible() {
        let src = "\
MyStruct public config;
uint256[] public history;
uint256 public supply;";
        let vars = extract_variables(&lines(src));
        assert_eq!(vars.len(), 1, "only the scalar should match, got: {vars:?}");
        assert_eq!(vars[0].name, "supply");
    }
}
