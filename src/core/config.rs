//! Configuration file management.
//!
//! Reads and validates `config.toml`. A missing default file means
//! defaults everywhere; an explicitly named file must exist.
//!
//! ```toml
//! [vault]
//! parent_path = "/var/lib/cmsvault"
//! prefix = "cms"
//!
//! [directory]
//! default_domain = "CORP"
//!
//! [directory.accounts.CORP]
//! svc-sql = "S-1-5-21-1004336348-1177238915-682003330-1104"
//!
//! [remote]
//! connect_timeout_secs = 10
//!
//! [clusters]
//! sqlcl1 = ["sql-01", "sql-02"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::core::directory::{Directory, SystemDirectory};
use crate::core::domain::{Host, Sid, Token};
use crate::core::store::Filesystem;
use crate::core::targets::Clusters;
use crate::core::types::Prefix;
use crate::core::validation;
use crate::error::{ConfigError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub vault: VaultConfig,
    pub directory: DirectoryConfig,
    pub remote: RemoteConfig,
    pub clusters: Clusters,
}

/// Storage locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// Root holding the `<prefix>_<host>` secret directories
    pub parent_path: PathBuf,
    /// Secret directory prefix
    pub prefix: Prefix,
    /// Key store root, defaults to `<parent_path>/keys`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_store: Option<PathBuf>,
    /// Local host name override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            parent_path: PathBuf::from(constants::DEFAULT_PARENT_PATH),
            prefix: constants::DEFAULT_PREFIX.to_string(),
            key_store: None,
            host: None,
        }
    }
}

impl VaultConfig {
    pub fn key_store_path(&self) -> PathBuf {
        self.key_store
            .clone()
            .unwrap_or_else(|| self.parent_path.join(constants::KEY_STORE_DIR))
    }
}

/// Account lookup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Domain bare principal names are qualified against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_domain: Option<String>,
    /// Local machine name used to qualify local accounts, defaults to the host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    /// Local user to act as, defaults to the process owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub passwd: PathBuf,
    pub group: PathBuf,
    /// Domain accounts: `[directory.accounts.<DOMAIN>] name = "S-1-..."`
    pub accounts: BTreeMap<String, BTreeMap<String, Sid>>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_domain: None,
            machine: None,
            user: None,
            passwd: PathBuf::from("/etc/passwd"),
            group: PathBuf::from("/etc/group"),
            accounts: BTreeMap::new(),
        }
    }
}

/// Remote execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// ssh binary
    pub ssh: String,
    /// cmsvault binary on remote hosts
    pub command: String,
    /// Remote login user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub connect_timeout_secs: u64,
    pub exec_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            ssh: constants::DEFAULT_SSH.to_string(),
            command: constants::DEFAULT_REMOTE_COMMAND.to_string(),
            user: None,
            connect_timeout_secs: constants::DEFAULT_CONNECT_TIMEOUT_SECS,
            exec_timeout_secs: constants::DEFAULT_EXEC_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join(constants::CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// With `path`, the file must exist. Without it, the default location is
    /// tried and defaults are used if nothing is there.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile`, `ConfigError::Parse` or a validation
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => p,
                None => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::parse(&contents)?;
        debug!(clusters = config.clusters.names().count(), "config loaded");
        Ok(config)
    }

    /// Parse and validate TOML content.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::Serialize)?)
    }

    /// Validate values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        if let Err(e) = validation::validate_prefix(&self.vault.prefix) {
            return Err(ConfigError::InvalidValue {
                field: "vault.prefix",
                reason: e.to_string(),
            }
            .into());
        }

        if self.vault.parent_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "vault.parent_path",
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if self.remote.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.connect_timeout_secs",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if self.remote.exec_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.exec_timeout_secs",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if self.remote.command.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "remote.command",
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if let Some(domain) = &self.directory.default_domain {
            if domain.trim().is_empty() || domain.contains('\\') || domain.contains('@') {
                return Err(ConfigError::InvalidValue {
                    field: "directory.default_domain",
                    reason: format!("not a domain name: '{}'", domain),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// Everything an operation needs, loaded once.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub local_host: Host,
}

impl Context {
    /// Load configuration and determine the local host.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_config(Config::load(path)?)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let local_host = match &config.vault.host {
            Some(host) => host.clone(),
            None => Host::local()?,
        };
        debug!(host = %local_host, "local host");
        Ok(Self { config, local_host })
    }

    pub fn parent_path(&self) -> &Path {
        &self.config.vault.parent_path
    }

    pub fn prefix(&self) -> &str {
        &self.config.vault.prefix
    }

    pub fn store(&self) -> Filesystem {
        Filesystem::new(self.config.vault.key_store_path())
    }

    pub fn directory(&self) -> SystemDirectory {
        let dir = &self.config.directory;
        let machine = dir
            .machine
            .clone()
            .unwrap_or_else(|| self.local_host.to_string());
        SystemDirectory::new(machine, &dir.passwd, &dir.group)
            .with_default_domain(dir.default_domain.clone())
            .with_accounts(&dir.accounts)
            .with_user(dir.user.clone())
    }

    pub fn token(&self) -> Result<Token> {
        self.directory().current_token()
    }

    pub fn clusters(&self) -> &Clusters {
        &self.config.clusters
    }
}
