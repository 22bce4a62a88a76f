//! End-to-end generation tests over throwaway project trees.
//!
//! Each test writes an implementation contract into a tempdir, runs the
//! full pipeline, and checks the bytes that land on disk.

mod helpers;

use helpers::TestProject;
use solgen_core::generate::generate_file;
use solgen_core::types::{GenError, WriteOutcome};
use solgen_core::MarkerStyle;

const VAULT: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

/// @custom:interface build ./IVault.sol
/// @custom:interface import ./IOwnable.sol
/// @custom:interface replace Ownable with IOwnable
/// @custom:interface remove ReentrancyGuard
/// @custom:interface is IVaultEvents

import "./Ownable.sol";

/// A vault holding deposits.
contract Vault is Ownable, ReentrancyGuard {
    uint256 public totalDeposits;

    /// Emitted when funds arrive.
    event Deposited(address indexed from, uint256 amount);

    error NotOwner(address caller);

    /// Accepts a deposit.
    function deposit() external payable returns (uint256) {
        totalDeposits += msg.value;
        return totalDeposits;
    }

    function _sweep(address to) internal {
    }
}
"#;

#[test]
fn test_end_to_end_generates_interface() {
    let p = TestProject::new();
    let src = p.write("contracts/Vault.sol", VAULT);

    let outcome = generate_file(&src, &p.config(), true).unwrap();
    assert_eq!(outcome, WriteOutcome::Written);

    let out = p.read("contracts/IVault.sol");
    assert!(
        out.starts_with("// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;\n"),
        "got:\n{out}"
    );
    assert!(out.contains("import \"./IOwnable.sol\";"), "got:\n{out}");
    assert!(out.contains("/// A vault holding deposits.\ninterface"), "got:\n{out}");
    assert!(out.contains("interface IVault is IOwnable, IVaultEvents {"), "got:\n{out}");
    assert!(
        out.contains(
            "    /// Emitted when funds arrive.\n    event Deposited(address indexed from, uint256 amount);"
        ),
        "got:\n{out}"
    );
    assert!(out.contains("    error NotOwner(address caller);"), "got:\n{out}");
    assert!(
        out.contains("    function totalDeposits() external view returns (uint256);"),
        "got:\n{out}"
    );
    assert!(
        out.contains("    /// Accepts a deposit.\n    function deposit() external payable returns (uint256);"),
        "got:\n{out}"
    );
    assert!(!out.contains("_sweep"), "internal function must be absent, got:\n{out}");
    assert!(out.trim_end().ends_with('}'));
}

#[test]
fn test_idempotent_under_force() {
    let p = TestProject::new();
    let src = p.write("Vault.sol", VAULT);

    generate_file(&src, &p.config(), true).unwrap();
    let first = p.read("IVault.sol");
    generate_file(&src, &p.config(), true).unwrap();
    let second = p.read("IVault.sol");

    assert_eq!(first, second, "forced regeneration must be byte-identical");
}

#[test]
fn test_skip_when_output_newer() {
    let p = TestProject::new();
    let src = p.write("Vault.sol", VAULT);
    std::thread::sleep(std::time::Duration::from_millis(20));
    p.write("IVault.sol", "sentinel");

    let outcome = generate_file(&src, &p.config(), false).unwrap();
    assert_eq!(outcome, WriteOutcome::Skipped);
    assert_eq!(p.read("IVault.sol"), "sentinel", "skip must leave the output untouched");

    let outcome = generate_file(&src, &p.config(), true).unwrap();
    assert_eq!(outcome, WriteOutcome::Written);
    assert_ne!(p.read("IVault.sol"), "sentinel");
}

#[test]
fn test_missing_build_directive_errors() {
    let p = TestProject::new();
    let src = p.write("V.sol", "/// @custom:interface exclude x\ncontract V {\n}\n");

    let err = generate_file(&src, &p.config(), true).unwrap_err();
    assert!(matches!(err, GenError::MissingBuildDirective), "got: {err}");
}

#[test]
fn test_missing_contract_header_errors() {
    let p = TestProject::new();
    let src = p.write("L.sol", "/// @custom:interface build ./IL.sol\nlibrary L {\n}\n");

    let err = generate_file(&src, &p.config(), true).unwrap_err();
    assert!(matches!(err, GenError::ContractNotFound), "got: {err}");
}

#[test]
fn test_module_task_runs_independently() {
    let p = TestProject::new();
    p.write(
        "contracts/Token.sol",
        "/// @custom:interface build ./Unused.sol\n\
         contract Token is Ownable {\n\
             function mint(address to) external {\n\
             }\n\
         }\n",
    );
    let src = p.write(
        "contracts/Main.sol",
        "/// @custom:interface build ./IMain.sol\n\
         /// @custom:interface module \"./contracts/Token.sol\" to \"./IToken.sol\" --remove Ownable\n\
         contract Main is Ownable {\n\
         }\n",
    );

    generate_file(&src, &p.config(), true).unwrap();

    let token = p.read("contracts/IToken.sol");
    assert!(token.contains("interface IToken {"), "module flag must drop Ownable, got:\n{token}");
    assert!(token.contains("function mint(address to) external;"), "got:\n{token}");
    assert!(!p.exists("contracts/Unused.sol"), "task output must replace the build directive");

    // Module flags must not leak into the primary file's sets.
    let main = p.read("contracts/IMain.sol");
    assert!(main.contains("interface IMain is Ownable {"), "got:\n{main}");
}

#[test]
fn test_module_failure_isolated() {
    let p = TestProject::new();
    let src = p.write(
        "Main.sol",
        "/// @custom:interface build ./IMain.sol\n\
         /// @custom:interface module \"./Missing.sol\" to \"./IMissing.sol\"\n\
         contract Main {\n\
         }\n",
    );

    let outcome = generate_file(&src, &p.config(), true).unwrap();
    assert_eq!(outcome, WriteOutcome::Written, "primary generation must survive");
    assert!(p.exists("IMain.sol"));
    assert!(!p.exists("IMissing.sol"));
}

#[test]
fn test_bang_marker_front_end() {
    let p = TestProject::new();
    let mut config = p.config();
    config.marker = MarkerStyle::Bang;

    let src = p.write(
        "V.sol",
        "// !interface build ./IV.sol\n\
         contract V {\n\
             function ping() external {\n\
             }\n\
         }\n",
    );

    generate_file(&src, &config, true).unwrap();
    let out = p.read("IV.sol");
    assert!(out.contains("interface IV {"), "got:\n{out}");
    assert!(out.contains("function ping() external;"), "got:\n{out}");
}

#[test]
fn test_output_into_nested_directory() {
    let p = TestProject::new();
    let src = p.write(
        "contracts/V.sol",
        "/// @custom:interface build ./interfaces/IV.sol\n\
         contract V {\n\
         }\n",
    );

    generate_file(&src, &p.config(), true).unwrap();
    assert!(p.exists("contracts/interfaces/IV.sol"), "parent dirs must be created");
}
