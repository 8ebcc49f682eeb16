//! Tests for `cmsvault show`.

use crate::support::*;

#[test]
fn test_show_json_describes_identity() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let output = t.show_json(&[]);
    assert_success(&output);
    let json = stdout_json(&output);

    let identities = json[LOCAL_HOST]["identities"].as_array().unwrap();
    assert_eq!(identities.len(), 1);
    let status = &identities[0];
    assert_eq!(status["identity"], DB_IDENTITY);

    let certificates = status["certificates"].as_array().unwrap();
    assert_eq!(certificates.len(), 1);
    assert!(certificates[0]["subject"]
        .as_str()
        .unwrap()
        .starts_with("CN=h1-db-svc-"));
    assert_eq!(certificates[0]["thumbprint"].as_str().unwrap().len(), 128);

    assert_eq!(status["files"].as_array().unwrap().len(), 1);
    let access = status["access"].as_array().unwrap();
    assert!(access.iter().any(|ace| ace["sid"] == "S-1-22-1-1000"));
}

#[test]
fn test_show_lists_all_identities() {
    let t = Test::new();
    assert_success(&t.protect("db", "sa", "short"));
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let json = stdout_json(&t.show_json(&[]));
    let names: Vec<&str> = json[LOCAL_HOST]["identities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["identity"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["db", DB_IDENTITY]);
}

#[test]
fn test_show_human_output() {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));

    let output = t.cmd().args(["show", DB_IDENTITY]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "h1");
    assert_stdout_contains(&output, DB_IDENTITY);
    assert_stdout_contains(&output, "CN=h1-db-svc-");
    assert_stdout_contains(&output, "S-1-5-18 full-control");
    assert_stdout_excludes(&output, DB_SECRET);
}

#[test]
fn test_show_empty_vault() {
    let t = Test::new();
    let output = t.cmd().arg("show").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "nothing protected");
}

#[test]
fn test_show_unknown_identity_fails() {
    let t = Test::new();
    let output = t.show_json(&["ghost"]);
    assert_failure(&output);
    let json = stdout_json(&output);
    assert_eq!(json[LOCAL_HOST]["kind"], "not-found");
}
