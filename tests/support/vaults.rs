//! In-process vaults built from the same per-host config files the CLI uses.

use cmsvault::core::config::{Config, Context};
use cmsvault::core::vault::Vault;

use super::{Test, DEFAULT_USER};

impl Test {
    /// Load a host's context, acting as `user`.
    pub fn context_as(&self, host: &str, user: &str) -> Context {
        if !self.config_path(host).exists() {
            self.add_host(host);
        }
        let mut config = Config::load(Some(&self.config_path(host))).expect("failed to load config");
        config.directory.user = Some(user.to_string());
        Context::from_config(config).expect("failed to build context")
    }

    /// Open a host's vault as the default user.
    pub fn vault(&self, host: &str) -> Vault {
        self.vault_as(host, DEFAULT_USER)
    }

    /// Open a host's vault as `user`.
    pub fn vault_as(&self, host: &str, user: &str) -> Vault {
        Vault::open(&self.context_as(host, user)).expect("failed to open vault")
    }
}
