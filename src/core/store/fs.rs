//! Filesystem key store.
//!
//! One directory per certificate under the store root:
//!
//! ```text
//! <root>/<host>-<identity>-<timestamp>/
//!     certificate.toml   public metadata
//!     identity.key       private key, 0600
//!     identity.acl       access list guarding identity.key
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Months;
use tracing::{debug, warn};

use super::{KeyStore, PrivateKey};
use crate::core::cipher;
use crate::core::constants::{
    CERTIFICATE_FILE, KEY_ALGORITHM, KEY_FILE, SUBJECT_PREFIX, VALIDITY_YEARS,
};
use crate::core::domain::{Acl, Certificate, Generation, Host, KeyUsage, Token};
use crate::error::{AccessError, NotFoundError, Result, StoreError};

/// Key store rooted at a directory.
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn certificate_dir(&self, subject: &str) -> PathBuf {
        let name = subject.strip_prefix(SUBJECT_PREFIX).unwrap_or(subject);
        self.root.join(name)
    }

    fn read_record(dir: &Path) -> Result<Certificate> {
        let path = dir.join(CERTIFICATE_FILE);
        let contents = fs::read_to_string(&path).map_err(StoreError::ReadFailed)?;
        toml::from_str(&contents).map_err(|e| {
            StoreError::InvalidRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Write every part of a new key pair into an already created directory.
    fn write_keypair(dir: &Path, generation: &Generation, acl: &Acl) -> Result<Certificate> {
        let (identity, public_key) = cipher::generate_keypair();

        let not_before = generation.created;
        let not_after = not_before
            .checked_add_months(Months::new(VALIDITY_YEARS as u32 * 12))
            .ok_or_else(|| StoreError::IssuanceFailed("validity overflow".to_string()))?;

        let certificate = Certificate {
            subject: generation.subject(),
            host: generation.host.clone(),
            identity: generation.identity.clone(),
            created: generation.created,
            not_before,
            not_after,
            key_usage: KeyUsage::DataEncipherment,
            exportable: false,
            algorithm: KEY_ALGORITHM.to_string(),
            thumbprint: cipher::thumbprint(&public_key),
            public_key,
        };

        let key_path = dir.join(KEY_FILE);
        PrivateKey::write(&key_path, &identity)?;
        acl.save(&key_path)?;

        let record = toml::to_string_pretty(&certificate)
            .map_err(|e| StoreError::IssuanceFailed(e.to_string()))?;
        fs::write(dir.join(CERTIFICATE_FILE), record).map_err(StoreError::WriteFailed)?;

        Ok(certificate)
    }
}

impl KeyStore for Filesystem {
    fn create(&self, generation: &Generation, acl: &Acl) -> Result<Certificate> {
        let dir = self.certificate_dir(&generation.name());
        debug!(path = %dir.display(), "creating key pair");

        fs::create_dir_all(&self.root)
            .map_err(|e| StoreError::IssuanceFailed(format!("{}: {}", self.root.display(), e)))?;
        fs::create_dir(&dir)
            .map_err(|e| StoreError::IssuanceFailed(format!("{}: {}", dir.display(), e)))?;

        match Self::write_keypair(&dir, generation, acl) {
            Ok(certificate) => {
                debug!(subject = %certificate.subject, "key pair created");
                Ok(certificate)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    warn!(path = %dir.display(), error = %cleanup, "failed to clean up partial key pair");
                }
                Err(StoreError::IssuanceFailed(e.to_string()).into())
            }
        }
    }

    fn find(&self, host: &Host, identity: Option<&str>) -> Result<Vec<Certificate>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(StoreError::ReadFailed)? {
            let entry = entry.map_err(StoreError::ReadFailed)?;
            let dir = entry.path();
            if !dir.join(CERTIFICATE_FILE).exists() {
                continue;
            }
            let certificate = match Self::read_record(&dir) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "skipping unreadable certificate");
                    continue;
                }
            };
            if &certificate.host != host {
                continue;
            }
            if identity.is_some_and(|id| certificate.identity != id) {
                continue;
            }
            found.push(certificate);
        }

        found.sort_by(|a, b| a.created.cmp(&b.created));
        Ok(found)
    }

    fn get(&self, subject: &str) -> Result<Option<Certificate>> {
        let dir = self.certificate_dir(subject);
        if !dir.join(CERTIFICATE_FILE).exists() {
            return Ok(None);
        }
        Self::read_record(&dir).map(Some)
    }

    fn private_key_location(&self, certificate: &Certificate) -> Result<PathBuf> {
        let path = self.certificate_dir(&certificate.subject).join(KEY_FILE);
        if !path.exists() {
            return Err(NotFoundError::CertificateSubject(certificate.subject.clone()).into());
        }
        Ok(path)
    }

    fn load_private_key(&self, certificate: &Certificate, token: &Token) -> Result<PrivateKey> {
        let location = self.private_key_location(certificate)?;
        let acl = Acl::load(&location)?;
        if !acl.allows_read(token) {
            debug!(subject = %certificate.subject, user = %token.user, "access check failed");
            return Err(AccessError::Denied {
                certificate: certificate.subject.clone(),
            }
            .into());
        }
        PrivateKey::load(&location)
    }

    fn delete(&self, certificate: &Certificate) -> Result<()> {
        let dir = self.certificate_dir(&certificate.subject);
        debug!(path = %dir.display(), "deleting key pair");
        fs::remove_dir_all(&dir).map_err(StoreError::WriteFailed)?;
        Ok(())
    }
}
