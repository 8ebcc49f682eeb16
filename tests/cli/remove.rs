//! Tests for `cmsvault remove`.

use crate::support::*;

#[test]
fn test_remove_deletes_everything() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, "one"));
    assert_success(&t.protect_with(DB_IDENTITY, DB_USERNAME, "two", &["--reset", "--no-prune"]));

    let output = t.remove(DB_IDENTITY, &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "removed db-svc (2 certificate(s), 2 file(s))");

    assert!(t.certificates(LOCAL_HOST).is_empty());
    assert!(t.secret_files(LOCAL_HOST).is_empty());
    assert_failure(&t.unprotect_plain(DB_IDENTITY));
}

#[test]
fn test_remove_leaves_other_identities() {
    let t = Test::new();
    assert_success(&t.protect("db", "sa", "short"));
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    assert_success(&t.remove("db", &[]));
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), DB_SECRET);
    assert_eq!(t.certificates(LOCAL_HOST).len(), 1);
}

#[test]
fn test_remove_unknown_identity_fails() {
    let t = Test::new();
    let output = t.remove("ghost", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "✗ h1: [not-found]");
    assert_stderr_contains(&output, "1 of 1 hosts failed");
}

#[test]
fn test_remove_invalid_prefix_keeps_everything() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    assert_failure(&t.remove(DB_IDENTITY, &["--prefix", "../x"]));
    assert_eq!(t.certificates(LOCAL_HOST).len(), 1);
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), DB_SECRET);
}

#[test]
fn test_remove_other_prefix_keeps_certificate_in_use() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let output = t.remove(DB_IDENTITY, &["--prefix", "other"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "[not-found]");
    assert_eq!(t.certificates(LOCAL_HOST).len(), 1);
    assert_eq!(stdout(&t.unprotect_plain(DB_IDENTITY)).trim_end(), DB_SECRET);
}
