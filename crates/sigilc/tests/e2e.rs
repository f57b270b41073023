//! End-to-end integration tests for the Sigil compiler CLI.
//!
//! Each test writes a small project to a temp directory, invokes the
//! compiled `sigilc` binary as a subprocess, and asserts against the
//! JSON envelope it prints to stdout. `run`/`test` additionally require
//! `node` on PATH, mirroring the compiler's own host-runtime assumption.

use std::path::PathBuf;
use std::process::Command;

fn find_sigilc() -> PathBuf {
    let mut path = std::env::current_exe().expect("cannot find current exe").parent().expect("cannot find parent dir").to_path_buf();
    if path.file_name().map_or(false, |n| n == "deps") {
        path = path.parent().unwrap().to_path_buf();
    }
    let bin = path.join("sigilc");
    assert!(bin.exists(), "sigilc binary not found at {}. Run `cargo build -p sigilc` first.", bin.display());
    bin
}

fn run_cli(args: &[&str]) -> serde_json::Value {
    let output = Command::new(find_sigilc()).args(args).output().expect("failed to invoke sigilc");
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| panic!("sigilc did not print a JSON envelope: {e}\nstdout: {stdout}\nstderr: {}", String::from_utf8_lossy(&output.stderr)))
}

fn write(dir: &std::path::Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn lex_emits_token_stream() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "main.sig", "λmain()→ℤ=1+1\n");
    let env = run_cli(&["lex", file.to_str().unwrap()]);
    assert_eq!(env["ok"], true);
    assert!(env["data"]["tokens"].as_array().unwrap().len() > 1);
}

#[test]
fn parse_emits_ast() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "main.sig", "λmain()→ℤ=1+1\n");
    let env = run_cli(&["parse", file.to_str().unwrap()]);
    assert_eq!(env["ok"], true);
    assert_eq!(env["data"]["decls"].as_array().unwrap().len(), 1);
}

#[test]
fn factorial_runs_and_returns_its_value() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "main.sig",
        "λfactorial(n:ℤ)→ℤ≡n{0→1|1→1|n→n*factorial(n-1)}\nλmain()→ℤ=factorial(5)\n",
    );
    let env = run_cli(&["run", file.to_str().unwrap()]);
    assert_eq!(env["ok"], true, "run failed: {env}");
    assert_eq!(env["data"]["result"], 120);
}

#[test]
fn accumulator_recursion_is_rejected_at_compile_time() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "main.sig",
        "λgo(n:ℤ,acc:ℤ)→ℤ≡n{0→acc|n→go(n-1,n*acc)}\nλmain()→ℤ=go(3,1)\n",
    );
    let env = run_cli(&["compile", file.to_str().unwrap()]);
    assert_eq!(env["ok"], false);
    assert_eq!(env["error"]["code"], "SIGIL-CANON-RECURSION-ACCUMULATOR");
}

#[test]
fn entry_file_without_main_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "main.sig", "λhelper()→ℤ=1\n");
    let env = run_cli(&["compile", file.to_str().unwrap()]);
    assert_eq!(env["ok"], false);
    assert_eq!(env["error"]["code"], "SIGIL-CANON-ENTRY-NO-MAIN");
}

#[test]
fn test_subcommand_reports_pass_and_fail_counts() {
    let dir = tempfile::tempdir().unwrap();
    let tests_dir = dir.path().join("tests");
    write(&tests_dir, "addition.sig", "test \"adds\" { 1+1 = 2 }\n");
    write(&tests_dir, "wrong.sig", "test \"wrong\" { 1+1 = 3 }\n");
    let env = run_cli(&["test", tests_dir.to_str().unwrap()]);
    assert_eq!(env["summary"]["passed"], 1, "envelope: {env}");
    assert_eq!(env["summary"]["failed"], 1, "envelope: {env}");
    assert_eq!(env["ok"], false);
}
