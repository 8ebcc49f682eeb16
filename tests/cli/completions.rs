//! Tests for `cmsvault completions`.

use crate::support::*;

#[test]
fn test_completions_bash() {
    let t = Test::new();
    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "cmsvault");
    assert_stdout_contains(&output, "protect");
}

#[test]
fn test_completions_zsh() {
    let t = Test::new();
    let output = t.cmd().args(["completions", "zsh"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "#compdef cmsvault");
}

#[test]
fn test_completions_need_no_config() {
    let t = Test::new();
    let output = t
        .cmd()
        .env("CMSVAULT_CONFIG", t.dir.path().join("missing.toml"))
        .args(["completions", "fish"])
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_serve_is_hidden_from_help() {
    let t = Test::new();
    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "protect");
    assert_stdout_contains(&output, "reset-access");
    assert_stdout_excludes(&output, "serve");
}
