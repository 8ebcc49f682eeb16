//! Tests for `cmsvault protect`.

use crate::support::*;

#[test]
fn test_protect_roundtrip() {
    let t = Test::new();
    assert_roundtrip(&t, DB_IDENTITY, DB_USERNAME, DB_SECRET);
}

#[test]
fn test_protect_reports_issued_certificate() {
    let t = Test::new();

    let output = t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET);
    assert_success(&output);
    assert_stdout_contains(&output, "✓ h1: protected db-svc (issued CN=h1-db-svc-");

    let files = t.secret_files(LOCAL_HOST);
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("h1-db-svc-"));
    assert!(files[0].ends_with(".txt"));
}

#[test]
fn test_protect_reuses_current_certificate() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, "first"));
    let before = t.certificates(LOCAL_HOST);

    let output = t.protect(DB_IDENTITY, DB_USERNAME, "second");
    assert_success(&output);
    assert_stdout_contains(&output, "reused");

    assert_eq!(t.certificates(LOCAL_HOST), before);
    assert_eq!(t.secret_files(LOCAL_HOST).len(), 1);
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), "second");
}

#[test]
fn test_protect_reset_issues_new_certificate() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, "first"));
    let before = t.certificates(LOCAL_HOST);

    let output = t.protect_with(DB_IDENTITY, DB_USERNAME, "second", &["--reset"]);
    assert_success(&output);
    assert_stdout_contains(&output, "issued");
    assert_stdout_contains(&output, "pruned 1 certificate(s) and 1 file(s)");

    let after = t.certificates(LOCAL_HOST);
    assert_eq!(after.len(), 1);
    assert_ne!(after, before);
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), "second");
}

#[test]
fn test_protect_no_prune_keeps_generations() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, "first"));
    assert_success(&t.protect_with(DB_IDENTITY, DB_USERNAME, "second", &["--reset", "--no-prune"]));

    assert_eq!(t.certificates(LOCAL_HOST).len(), 2);
    assert_eq!(t.secret_files(LOCAL_HOST).len(), 2);
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), "second");
}

#[test]
fn test_protect_keep_bounds_generations() {
    let t = Test::new();
    for secret in ["one", "two", "three", "four"] {
        assert_success(&t.protect_with(DB_IDENTITY, DB_USERNAME, secret, &["--reset", "--keep", "2"]));
    }

    assert_eq!(t.certificates(LOCAL_HOST).len(), 2);
    assert_eq!(t.secret_files(LOCAL_HOST).len(), 2);
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), "four");
}

#[test]
fn test_protect_keep_conflicts_with_no_prune() {
    let t = Test::new();
    let output = t.protect_with(DB_IDENTITY, DB_USERNAME, DB_SECRET, &["--keep", "2", "--no-prune"]);
    assert_failure(&output);
    assert!(t.certificates(LOCAL_HOST).is_empty());
}

#[test]
fn test_protect_empty_secret_fails() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["protect", DB_IDENTITY, "--username", DB_USERNAME, "--secret-stdin"])
        .write_stdin("\n")
        .output()
        .unwrap();

    assert_failure(&output);
    assert_stderr_contains(&output, "secret cannot be empty");
    assert!(t.certificates(LOCAL_HOST).is_empty());
}

#[test]
fn test_protect_requires_username_without_terminal() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["protect", DB_IDENTITY])
        .write_stdin("secret\n")
        .output()
        .unwrap();

    assert_failure(&output);
    assert_stderr_contains(&output, "username cannot be empty");
}

#[test]
fn test_protect_rejects_invalid_identity() {
    let t = Test::new();
    let output = t.protect("../etc", DB_USERNAME, DB_SECRET);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid identity");
}

#[test]
fn test_protect_identities_are_independent() {
    let t = Test::new();
    assert_success(&t.protect("db", "sa", "short"));
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    assert_eq!(stdout(&t.unprotect_plain("db")).trim_end(), "short");
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), DB_SECRET);
    assert_eq!(t.certificates(LOCAL_HOST).len(), 2);
}

#[test]
fn test_protect_under_prefix() {
    let t = Test::new();
    assert_success(&t.protect_with(DB_IDENTITY, DB_USERNAME, DB_SECRET, &["--prefix", "alt"]));

    assert!(t.secret_files(LOCAL_HOST).is_empty());
    assert!(t.data_dir(LOCAL_HOST).join("alt_h1").is_dir());

    let output = t
        .cmd()
        .args(["unprotect", DB_IDENTITY, "--plain-text", "--prefix", "alt"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), DB_SECRET);
    assert_failure(&t.unprotect_plain(DB_IDENTITY));
}

#[test]
fn test_protect_rejects_invalid_prefix() {
    let t = Test::new();
    let output = t.protect_with(DB_IDENTITY, DB_USERNAME, DB_SECRET, &["--prefix", "../up"]);
    assert_failure(&output);
    assert!(t.certificates(LOCAL_HOST).is_empty());
}
