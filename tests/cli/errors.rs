//! Error reporting and configuration failures.

use std::fs;

use crate::support::*;

#[test]
fn test_missing_config_file() {
    let t = Test::new();
    let output = t
        .cmd()
        .env("CMSVAULT_CONFIG", t.dir.path().join("missing.toml"))
        .arg("show")
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to read config file");
}

#[test]
fn test_invalid_config_value() {
    let t = Test::new();
    let path = t.dir.path().join("bad.toml");
    fs::write(&path, "[vault]\nprefix = \"../up\"\n").unwrap();

    let output = t.cmd().arg("--config").arg(&path).arg("show").output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid config value for 'vault.prefix'");
}

#[test]
fn test_unknown_config_key() {
    let t = Test::new();
    let path = t.dir.path().join("typo.toml");
    fs::write(&path, "[vault]\nparent_pth = \"/tmp\"\n").unwrap();

    let output = t.cmd().arg("--config").arg(&path).arg("show").output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_unknown_local_user() {
    let t = Test::new();
    t.configure(LOCAL_HOST, "nobody-here");

    let output = t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET);
    assert_failure(&output);
    assert_stderr_contains(&output, "nobody-here");
}

#[test]
fn test_errors_are_plain_without_color() {
    let t = Test::new();
    let output = t.unprotect_plain("ghost");
    assert_failure(&output);
    assert!(stderr(&output).starts_with("✗ "));
    assert!(!stderr(&output).contains('\u{1b}'));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::new();
    let output = t
        .cmd()
        .args(["-v", "show"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "DEBUG");
    assert_stdout_excludes(&output, "DEBUG");
}
