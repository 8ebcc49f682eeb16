//! Tests for `cmsvault grant`, `revoke` and `reset-access`.

use crate::support::*;

fn protected() -> Test {
    let t = Test::new();
    assert_success(&t.protect(DB_IDENTITY, DB_USERNAME, DB_SECRET));
    t
}

fn access_sids(t: &Test) -> Vec<String> {
    let json = stdout_json(&t.show_json(&[DB_IDENTITY]));
    json[LOCAL_HOST]["identities"][0]["access"]
        .as_array()
        .expect("access list")
        .iter()
        .map(|ace| ace["sid"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_grant_local_user_can_decrypt() {
    let t = protected();

    let output = t.grant(DB_IDENTITY, &[OTHER_USER], &["--local"]);
    assert_success(&output);
    assert_stdout_contains(&output, &format!("+{}", BOB_SID));

    t.configure(LOCAL_HOST, OTHER_USER);
    let output = t.unprotect_plain(DB_IDENTITY);
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), DB_SECRET);
}

#[test]
fn test_grant_group_covers_members() {
    let t = protected();
    assert_success(&t.grant(DB_IDENTITY, &["dbadmins"], &["--local"]));
    assert!(access_sids(&t).contains(&DBADMINS_SID.to_string()));

    t.configure(LOCAL_HOST, GROUP_USER);
    assert_success(&t.unprotect_plain(DB_IDENTITY));
}

#[test]
fn test_grant_bare_name_uses_default_domain() {
    let t = protected();

    assert_success(&t.grant(DB_IDENTITY, &["app-pool"], &[]));
    assert_success(&t.grant(DB_IDENTITY, &["CORP\\sql-admins"], &[]));

    let sids = access_sids(&t);
    assert!(sids.contains(&APP_POOL_SID.to_string()));
    assert!(sids.contains(&SQL_ADMINS_SID.to_string()));
}

#[test]
fn test_grant_is_idempotent() {
    let t = protected();
    assert_success(&t.grant(DB_IDENTITY, &[BOB_SID], &[]));
    let before = access_sids(&t);

    let output = t.grant(DB_IDENTITY, &[BOB_SID], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "grant unchanged");
    assert_eq!(access_sids(&t), before);
}

#[test]
fn test_grant_then_revoke_restores_access() {
    let t = protected();
    let original = access_sids(&t);

    assert_success(&t.grant(DB_IDENTITY, &[OTHER_USER], &["--local"]));
    let output = t.revoke(DB_IDENTITY, &[OTHER_USER], &["--local"]);
    assert_success(&output);
    assert_stdout_contains(&output, &format!("-{}", BOB_SID));
    assert_eq!(access_sids(&t), original);

    t.configure(LOCAL_HOST, OTHER_USER);
    assert_failure(&t.unprotect_plain(DB_IDENTITY));
}

#[test]
fn test_unresolvable_principal_changes_nothing() {
    let t = protected();
    let original = access_sids(&t);

    let output = t.grant(DB_IDENTITY, &[OTHER_USER, "ghost"], &["--local"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "✗ h1: [access-control]");
    assert_stderr_contains(&output, "ghost");
    assert_eq!(access_sids(&t), original);
}

#[test]
fn test_grant_requires_certificate() {
    let t = Test::new();
    let output = t.grant(DB_IDENTITY, &[OTHER_USER], &["--local"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "[not-found]");
}

#[test]
fn test_grant_requires_principal_argument() {
    let t = protected();
    let output = t.cmd().args(["grant", DB_IDENTITY]).output().unwrap();
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_reset_access_restores_baseline() {
    let t = protected();
    assert_success(&t.grant(DB_IDENTITY, &[OTHER_USER], &["--local"]));
    assert_success(&t.grant(DB_IDENTITY, &["app-pool"], &[]));

    let output = t
        .cmd()
        .args(["reset-access", DB_IDENTITY])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "reset on CN=h1-db-svc-");

    let sids = access_sids(&t);
    assert_eq!(sids, vec!["S-1-5-18".to_string(), "S-1-5-32-544".to_string()]);

    // The owner is gone too; only the system account can still read.
    assert_failure(&t.unprotect_plain(DB_IDENTITY));
    t.configure(LOCAL_HOST, "root");
    assert_success(&t.unprotect_plain(DB_IDENTITY));
}
