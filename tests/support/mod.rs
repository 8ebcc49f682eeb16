//! Test support utilities for cmsvault integration tests.
//!
//! Provides isolated per-test environments and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod vaults;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated temp directory.
///
/// Every simulated host gets its own config file, secret directory and key
/// store under the temp dir. They share one passwd/group pair and a fake
/// `ssh` that runs `cmsvault serve --stdio` with the target host's config,
/// so fleet commands work without a network. No process-global state is
/// mutated and tests can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// Create an environment with host `h1` configured.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let t = Self { dir };
        fs::write(t.passwd_path(), PASSWD).expect("failed to write passwd");
        fs::write(t.group_path(), GROUP).expect("failed to write group");
        t.write_fake_ssh();
        t.add_host(LOCAL_HOST);
        t
    }

    /// Create an environment with every host of the test cluster configured.
    pub fn cluster() -> Self {
        let t = Self::new();
        for host in CLUSTER_HOSTS {
            t.add_host(host);
        }
        t
    }

    /// Configure a host, acting as the default user.
    pub fn add_host(&self, host: &str) {
        self.configure(host, DEFAULT_USER);
    }

    /// Write (or rewrite) a host's config, acting as `user`.
    pub fn configure(&self, host: &str, user: &str) {
        fs::write(self.config_path(host), self.config_toml(host, user))
            .expect("failed to write config");
    }

    pub fn config_path(&self, host: &str) -> PathBuf {
        self.dir.path().join(format!("{}.toml", host))
    }

    pub fn host_root(&self, host: &str) -> PathBuf {
        self.dir.path().join(host)
    }

    pub fn data_dir(&self, host: &str) -> PathBuf {
        self.host_root(host).join("data")
    }

    pub fn key_dir(&self, host: &str) -> PathBuf {
        self.host_root(host).join("keys")
    }

    /// Secret directory for a host with the default prefix.
    pub fn secret_dir(&self, host: &str) -> PathBuf {
        self.data_dir(host).join(format!("cms_{}", host))
    }

    pub fn passwd_path(&self) -> PathBuf {
        self.dir.path().join("passwd")
    }

    pub fn group_path(&self) -> PathBuf {
        self.dir.path().join("group")
    }

    pub fn ssh_path(&self) -> PathBuf {
        self.dir.path().join("fake-ssh")
    }

    /// Names of the secret files stored for a host, sorted.
    pub fn secret_files(&self, host: &str) -> Vec<String> {
        list_names(&self.secret_dir(host))
    }

    /// Names of the certificate directories stored for a host, sorted.
    pub fn certificates(&self, host: &str) -> Vec<String> {
        list_names(&self.key_dir(host))
    }

    fn config_toml(&self, host: &str, user: &str) -> String {
        #[allow(deprecated)]
        let bin = assert_cmd::cargo::cargo_bin("cmsvault");
        format!(
            r#"[vault]
host = "{host}"
parent_path = "{data}"
key_store = "{keys}"

[directory]
user = "{user}"
passwd = "{passwd}"
group = "{group}"
default_domain = "corp"

[directory.accounts.corp]
app-pool = "{app_pool}"
sql-admins = "{sql_admins}"

[remote]
ssh = "{ssh}"
command = "{bin}"
connect_timeout_secs = 5
exec_timeout_secs = 60

[clusters]
sqlcl1 = ["h1", "h2"]
lonely = ["h9"]
"#,
            host = host,
            data = self.data_dir(host).display(),
            keys = self.key_dir(host).display(),
            user = user,
            passwd = self.passwd_path().display(),
            group = self.group_path().display(),
            app_pool = APP_POOL_SID,
            sql_admins = SQL_ADMINS_SID,
            ssh = self.ssh_path().display(),
            bin = bin.display(),
        )
    }

    /// A stand-in for ssh. Arguments arrive as
    /// `-o BatchMode=yes -o ConnectTimeout=N <dest> <command> serve --stdio`.
    /// Hosts without a config file behave like unreachable machines.
    fn write_fake_ssh(&self) {
        let script = format!(
            r#"#!/bin/sh
dest="$5"
host="${{dest#*@}}"
command="$6"
config="{root}/$host.toml"
if [ ! -f "$config" ]; then
    echo "ssh: connect to host $host port 22: No route to host" >&2
    exit 255
fi
NO_COLOR=1 exec "$command" --config "$config" serve --stdio
"#,
            root = self.dir.path().display()
        );
        let path = self.ssh_path();
        fs::write(&path, script).expect("failed to write fake ssh");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("failed to make fake ssh executable");
        }
    }
}

fn list_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| !n.ends_with(".tmp"))
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
