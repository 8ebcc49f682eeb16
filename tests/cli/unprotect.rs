//! Tests for `cmsvault unprotect`.

use std::fs;

use crate::support::*;

#[test]
fn test_unprotect_masks_secret_by_default() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let output = t.cmd().args(["unprotect", DB_IDENTITY]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, DB_USERNAME);
    assert_stdout_contains(&output, "********");
    assert_stdout_excludes(&output, DB_SECRET);
}

#[test]
fn test_unprotect_json() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let output = t.cmd().args(["unprotect", DB_IDENTITY, "--json"]).output().unwrap();
    assert_success(&output);
    let json = stdout_json(&output);
    assert_eq!(json["identity"], DB_IDENTITY);
    assert_eq!(json["host"], LOCAL_HOST);
    assert_eq!(json["username"], DB_USERNAME);
    assert!(json.get("secret").is_none());

    let output = t
        .cmd()
        .args(["unprotect", DB_IDENTITY, "--json", "--plain-text"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout_json(&output)["secret"], DB_SECRET);
}

#[test]
fn test_unprotect_missing_identity() {
    let t = Test::new();

    let output = t.unprotect_plain("ghost");
    assert_failure(&output);
    assert_stderr_contains(&output, "no protected credential found for 'ghost' on h1");
    assert_stderr_contains(&output, "cmsvault protect");
}

#[test]
fn test_unprotect_denied_without_grant() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    t.configure(LOCAL_HOST, OTHER_USER);
    let output = t.unprotect_plain(DB_IDENTITY);
    assert_failure(&output);
    assert_stderr_contains(&output, "access denied");
    assert_stderr_contains(&output, "cmsvault grant");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_unprotect_system_account_always_allowed() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    t.configure(LOCAL_HOST, "root");
    let output = t.unprotect_plain(DB_IDENTITY);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), DB_SECRET);
}

#[test]
fn test_unprotect_garbage_file() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let file = t.secret_dir(LOCAL_HOST).join(&t.secret_files(LOCAL_HOST)[0]);
    fs::write(&file, "not an envelope").unwrap();

    let output = t.unprotect_plain(DB_IDENTITY);
    assert_failure(&output);
    assert_stderr_contains(&output, "malformed");
}

#[test]
fn test_unprotect_with_prefix() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let output = t
        .cmd()
        .args(["unprotect", DB_IDENTITY, "--plain-text", "--prefix", "other"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "no protected credential found");
}
