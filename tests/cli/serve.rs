//! Tests for the hidden `cmsvault serve --stdio` endpoint.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_serve_answers_show() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let output = t
        .cmd()
        .args(["serve", "--stdio"])
        .write_stdin(r#"{"op":"show","identity":"db-svc"}"#)
        .output()
        .unwrap();
    assert_success(&output);

    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["body"]["result"], "shown");
    assert_eq!(json["body"]["identities"][0]["identity"], DB_IDENTITY);
}

#[test]
fn test_serve_reports_failures_in_band() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["serve", "--stdio"])
        .write_stdin(r#"{"op":"remove","identity":"ghost"}"#)
        .output()
        .unwrap();
    assert_success(&output);

    let json = stdout_json(&output);
    assert_eq!(json["status"], "failed");
    assert_eq!(json["body"]["kind"], "not-found");
}

#[test]
fn test_serve_rejects_unknown_operation() {
    let t = Test::new();
    t.cmd()
        .args(["serve", "--stdio"])
        .write_stdin(r#"{"op":"unprotect","identity":"db-svc"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\":\"content-invalid\""));
}

#[test]
fn test_serve_requires_stdio_flag() {
    let t = Test::new();
    t.cmd()
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--stdio"));
}
