//! Command helper methods for Test.

use super::{Test, LOCAL_HOST};
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a cmsvault command running on the local test host.
    pub fn cmd(&self) -> Command {
        self.cmd_on(LOCAL_HOST)
    }

    /// Create a cmsvault command running on a given test host.
    ///
    /// Returns a Command configured with:
    /// - CMSVAULT_CONFIG pointing at the host's config file
    /// - NO_COLOR set so output is plain
    /// - CMSVAULT_LOG removed so tests see the default filter
    pub fn cmd_on(&self, host: &str) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("cmsvault").expect("failed to find cmsvault binary");
        cmd.env("CMSVAULT_CONFIG", self.config_path(host));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("CMSVAULT_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `cmsvault protect` with the secret on stdin.
    pub fn protect(&self, identity: &str, username: &str, secret: &str) -> Output {
        self.protect_with(identity, username, secret, &[])
    }

    /// Shortcut for `cmsvault protect` with extra arguments.
    pub fn protect_with(&self, identity: &str, username: &str, secret: &str, extra: &[&str]) -> Output {
        self.cmd()
            .args(["protect", identity, "--username", username, "--secret-stdin"])
            .args(extra)
            .write_stdin(format!("{}\n", secret))
            .output()
            .expect("failed to run cmsvault protect")
    }

    /// Shortcut for `cmsvault unprotect --plain-text` on the local host.
    pub fn unprotect_plain(&self, identity: &str) -> Output {
        self.unprotect_plain_on(LOCAL_HOST, identity)
    }

    /// Shortcut for `cmsvault unprotect --plain-text` on a given host.
    pub fn unprotect_plain_on(&self, host: &str, identity: &str) -> Output {
        self.cmd_on(host)
            .args(["unprotect", identity, "--plain-text"])
            .output()
            .expect("failed to run cmsvault unprotect")
    }

    /// Shortcut for `cmsvault show --json` with extra arguments.
    pub fn show_json(&self, extra: &[&str]) -> Output {
        self.cmd()
            .args(["show", "--json"])
            .args(extra)
            .output()
            .expect("failed to run cmsvault show --json")
    }

    /// Shortcut for `cmsvault grant`.
    pub fn grant(&self, identity: &str, principals: &[&str], extra: &[&str]) -> Output {
        self.cmd()
            .args(["grant", identity])
            .args(principals)
            .args(extra)
            .output()
            .expect("failed to run cmsvault grant")
    }

    /// Shortcut for `cmsvault revoke`.
    pub fn revoke(&self, identity: &str, principals: &[&str], extra: &[&str]) -> Output {
        self.cmd()
            .args(["revoke", identity])
            .args(principals)
            .args(extra)
            .output()
            .expect("failed to run cmsvault revoke")
    }

    /// Shortcut for `cmsvault remove`.
    pub fn remove(&self, identity: &str, extra: &[&str]) -> Output {
        self.cmd()
            .args(["remove", identity])
            .args(extra)
            .output()
            .expect("failed to run cmsvault remove")
    }
}
