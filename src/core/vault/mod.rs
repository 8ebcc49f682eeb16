//! The primary interface for vault operations on one host.
//!
//! Vault owns the key store, the account directory and the caller's token,
//! and provides every operation that touches local state.

mod access;
mod issuer;
mod retention;
mod secrets;

pub use access::{AccessMode, AccessOutcome};
pub use retention::RetentionReport;
pub use secrets::{
    CertificateSummary, IdentityStatus, ProtectOptions, ProtectOutcome, RemoveOutcome,
    ShowOutcome,
};

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::core::config::Context;
use crate::core::directory::Directory;
use crate::core::domain::{Certificate, Host, SecretFile, Token};
use crate::core::store::KeyStore;
use crate::core::types::Prefix;
use crate::core::validation;
use crate::error::Result;

/// Where secret files live on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub host: Host,
    pub parent_path: PathBuf,
    pub prefix: Prefix,
}

/// The primary interface for vault operations.
///
/// Bound to one host, one key store and one caller.
pub struct Vault {
    layout: Layout,
    store: Box<dyn KeyStore>,
    directory: Box<dyn Directory>,
    token: Token,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("layout", &self.layout)
            .field("token", &self.token)
            .finish()
    }
}

impl Vault {
    pub fn new(
        layout: Layout,
        store: Box<dyn KeyStore>,
        directory: Box<dyn Directory>,
        token: Token,
    ) -> Self {
        Self {
            layout,
            store,
            directory,
            token,
        }
    }

    /// Open the vault described by a loaded context, acting as the current
    /// process owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller's access token cannot be built.
    pub fn open(ctx: &Context) -> Result<Self> {
        let directory = ctx.directory();
        let token = directory.current_token()?;
        let layout = Layout {
            host: ctx.local_host.clone(),
            parent_path: ctx.parent_path().to_path_buf(),
            prefix: ctx.prefix().to_string(),
        };
        Ok(Self::new(
            layout,
            Box::new(ctx.store()),
            Box::new(directory),
            token,
        ))
    }

    pub fn host(&self) -> &Host {
        &self.layout.host
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn store(&self) -> &dyn KeyStore {
        self.store.as_ref()
    }

    /// Secret directory for this host, with an optional prefix override.
    pub(super) fn secret_dir(&self, prefix: Option<&str>) -> Result<PathBuf> {
        let prefix = match prefix {
            Some(p) => {
                validation::validate_prefix(p)?;
                p
            }
            None => self.layout.prefix.as_str(),
        };
        Ok(SecretFile::directory(
            &self.layout.parent_path,
            prefix,
            &self.layout.host,
        ))
    }

    /// Newest non-expired certificate for an identity on this host.
    pub fn current_certificate(&self, identity: &str) -> Result<Option<Certificate>> {
        validation::validate_identity(identity)?;
        let now = Utc::now();
        let current = self
            .store
            .find(&self.layout.host, Some(identity))?
            .into_iter()
            .filter(|c| c.is_valid_at(now))
            .max_by(|a, b| a.created.cmp(&b.created));
        Ok(current)
    }
}

/// Write a file atomically: temp file in the same directory, then rename.
pub(super) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or_default()
    ));
    std::fs::write(&tmp, contents)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
