//! Private key handle.
//!
//! Wraps an age x25519 identity loaded from the key store.

use std::fs;
use std::path::{Path, PathBuf};

use age::x25519;
use tracing::{debug, warn};

use crate::core::types::PublicKey;
use crate::error::{Result, StoreError};

/// A private key released by the key store for decryption.
pub struct PrivateKey {
    inner: x25519::Identity,
    path: PathBuf,
}

impl PrivateKey {
    /// Load a private key file.
    pub(super) fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading private key");

        #[cfg(unix)]
        {
            if crate::core::validation::validate_file_permissions(path, 0o600).is_err() {
                let mode = fs::metadata(path)
                    .map(|m| {
                        use std::os::unix::fs::PermissionsExt;
                        format!("{:o}", m.permissions().mode() & 0o777)
                    })
                    .unwrap_or_else(|_| "unknown".to_string());

                warn!(
                    path = %path.display(),
                    mode = %mode,
                    "insecure private key file permissions"
                );
            }
        }

        let contents = fs::read_to_string(path).map_err(StoreError::ReadFailed)?;
        let inner: x25519::Identity = contents
            .trim()
            .parse()
            .map_err(|e: &str| StoreError::InvalidFormat(e.to_string()))?;

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    /// Write a private key file readable by the owner only.
    pub(super) fn write(path: &Path, identity: &x25519::Identity) -> Result<()> {
        use age::secrecy::ExposeSecret;

        let secret = identity.to_string();
        fs::write(path, format!("{}\n", secret.expose_secret())).map_err(StoreError::WriteFailed)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .map_err(StoreError::WriteFailed)?;
        }

        debug!(path = %path.display(), "private key saved");
        Ok(())
    }

    /// Corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        self.inner.to_public().to_string()
    }

    /// Inner age identity for decryption.
    pub fn as_age(&self) -> &x25519::Identity {
        &self.inner
    }

    /// Key file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("path", &self.path)
            .field("public_key", &self.public_key())
            .finish()
    }
}
