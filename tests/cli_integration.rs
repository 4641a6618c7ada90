//! End-to-end checks of the `scui` binary that need no node.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{TestContext, TOKEN_ABI};

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("scui").expect("Failed to find scui binary")
}

#[test]
fn test_help_lists_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("console").and(predicate::str::contains("deploy")));
}

#[test]
fn test_unknown_command_is_usage_error() {
    cmd().arg("frobnicate").assert().code(255);
}

#[test]
fn test_deploy_without_signer_flags() {
    let ctx = TestContext::new();
    let bytecode = ctx.create_file("c.bin", "0x6080");
    let abi = ctx.create_file("c.abi", "[]");

    cmd()
        .arg("deploy")
        .arg("http://127.0.0.1:1")
        .arg(&bytecode)
        .arg(&abi)
        .assert()
        .code(254)
        .stderr(predicate::str::contains("signer arguments missing"));
}

#[test]
fn test_deploy_rejects_conflicting_key_flags() {
    cmd()
        .args(["deploy", "http://127.0.0.1:1", "c.bin", "c.abi", "-k", "a", "-e", "b"])
        .assert()
        .code(254)
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn test_deploy_rejects_negative_gas() {
    cmd()
        .args(["deploy", "http://127.0.0.1:1", "c.bin", "c.abi", "-w", "-p", "-3"])
        .assert()
        .code(254)
        .stderr(predicate::str::contains("negative"));
}

#[test]
fn test_deploy_with_missing_bytecode() {
    let ctx = TestContext::new();
    let key = ctx.create_file("k.hex", "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
    let abi = ctx.create_file("c.abi", "[]");

    cmd()
        .arg("deploy")
        .arg("http://127.0.0.1:1")
        .arg(ctx.temp_dir.path().join("missing.bin"))
        .arg(&abi)
        .arg("-k")
        .arg(&key)
        .assert()
        .code(253);
}

#[test]
fn test_deploy_with_wrong_argument_count() {
    let ctx = TestContext::new();
    let key = ctx.create_file("k.hex", "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
    let bytecode = ctx.create_file("c.bin", "6080");
    let abi = ctx.create_file(
        "c.abi",
        r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[{"name":"n","type":"uint8"}]}]"#,
    );

    cmd()
        .arg("deploy")
        .arg("http://127.0.0.1:1")
        .arg(&bytecode)
        .arg(&abi)
        .arg("-k")
        .arg(&key)
        .assert()
        .code(251);
}

#[test]
fn test_console_with_missing_abi() {
    let ctx = TestContext::new();
    cmd()
        .arg("console")
        .arg("http://127.0.0.1:1")
        .arg("0x4242424242424242424242424242424242424242")
        .arg(ctx.temp_dir.path().join("missing.abi"))
        .assert()
        .code(253);
}

#[test]
fn test_console_with_malformed_abi() {
    let ctx = TestContext::new();
    let abi = ctx.create_file("token.abi", "{ not json");
    cmd()
        .arg("console")
        .arg("http://127.0.0.1:1")
        .arg("0x4242424242424242424242424242424242424242")
        .arg(&abi)
        .assert()
        .code(252);
}

#[test]
fn test_console_with_bad_contract_address() {
    let ctx = TestContext::new();
    let abi = ctx.create_file("token.abi", TOKEN_ABI);
    cmd()
        .args(["console", "http://127.0.0.1:1", "not-an-address"])
        .arg(&abi)
        .assert()
        .code(252);
}

#[test]
fn test_completions() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scui"));
}
