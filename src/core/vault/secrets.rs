//! Secret operations.
//!
//! Protect, unprotect, remove and show credentials for this host.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::retention::RetentionReport;
use super::{write_atomic, Vault};
use crate::core::cipher::Envelope;
use crate::core::constants::DEFAULT_KEEP;
use crate::core::domain::{Ace, Acl, Certificate, Credential, SecretFile};
use crate::core::validation;
use crate::error::{ContentError, NotFoundError, Result, StoreError};

/// How `protect` treats existing generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectOptions {
    /// Always issue a new certificate
    pub reset: bool,
    /// Generations to keep afterwards; `None` disables pruning
    pub keep: Option<usize>,
    /// Secret directory prefix; the configured one when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl Default for ProtectOptions {
    fn default() -> Self {
        Self {
            reset: false,
            keep: Some(DEFAULT_KEEP),
            prefix: None,
        }
    }
}

/// Result of a successful `protect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectOutcome {
    /// Subject of the certificate the secret was sealed for
    pub certificate: String,
    /// Whether that certificate was issued by this call
    pub issued: bool,
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<RetentionReport>,
}

/// Result of retiring an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveOutcome {
    pub identity: String,
    pub retention: RetentionReport,
}

/// Public view of one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub created: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub thumbprint: String,
}

impl From<&Certificate> for CertificateSummary {
    fn from(c: &Certificate) -> Self {
        Self {
            subject: c.subject.clone(),
            created: c.created,
            not_after: c.not_after,
            thumbprint: c.thumbprint.clone(),
        }
    }
}

/// Everything stored for one identity on this host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityStatus {
    pub identity: String,
    /// Oldest first
    pub certificates: Vec<CertificateSummary>,
    /// Oldest first
    pub files: Vec<PathBuf>,
    /// Access list on the newest certificate's private key
    pub access: Vec<Ace>,
}

/// Result of `show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowOutcome {
    pub identities: Vec<IdentityStatus>,
}

impl Vault {
    /// Encrypt a credential for an identity on this host.
    ///
    /// Reuses the current certificate unless `options.reset` is set or none
    /// exists. The file is written atomically and retention only runs after
    /// the write succeeded, so a failure never leaves zero decryptable
    /// generations behind. Retention problems are reported in the outcome
    /// and never fail the call.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a bad identity or prefix, `StoreError` if a
    /// certificate cannot be issued and `CipherError` or I/O errors if
    /// sealing or writing fails.
    pub fn protect(
        &self,
        identity: &str,
        credential: &Credential,
        options: &ProtectOptions,
    ) -> Result<ProtectOutcome> {
        validation::validate_identity(identity)?;
        let prefix = options.prefix.as_deref();
        let dir = self.secret_dir(prefix)?;

        let current = if options.reset {
            debug!(identity, "reset requested, skipping certificate lookup");
            None
        } else {
            self.current_certificate(identity)?
        };

        let (certificate, issued) = match current {
            Some(c) => {
                debug!(subject = %c.subject, "reusing current certificate");
                (c, false)
            }
            None => (self.issue(identity)?, true),
        };

        let plaintext = credential.to_transport()?;
        let envelope = Envelope::seal(&plaintext, &certificate)?;

        let path = SecretFile::path_in(&dir, &certificate.generation());
        fs::create_dir_all(&dir).map_err(StoreError::WriteFailed)?;
        write_atomic(&path, &envelope.to_json()?).map_err(StoreError::WriteFailed)?;
        info!(path = %path.display(), subject = %certificate.subject, "credential protected");

        let retention = options.keep.map(|keep| {
            self.prune(identity, keep, prefix).unwrap_or_else(|e| {
                warn!(identity, error = %e, "retention skipped");
                RetentionReport::skipped(&e)
            })
        });

        Ok(ProtectOutcome {
            certificate: certificate.subject,
            issued,
            file: path,
            retention,
        })
    }

    /// Decrypt the newest credential stored for an identity on this host.
    ///
    /// # Errors
    ///
    /// - `NotFoundError::SecretFile` if nothing is stored
    /// - `NotFoundError::Certificate` if the sealing certificate is gone
    /// - `AccessError::Denied` if the caller holds no grant on its key
    /// - `CipherError::DecryptionFailed` if the key does not open the file
    /// - `ContentError` if the file or the decrypted payload is malformed
    pub fn unprotect(&self, identity: &str, prefix: Option<&str>) -> Result<Credential> {
        validation::validate_identity(identity)?;

        let dir = self.secret_dir(prefix)?;
        let file = SecretFile::list(&dir, &self.layout.host, Some(identity))?
            .pop()
            .ok_or_else(|| NotFoundError::SecretFile {
                identity: identity.to_string(),
                host: self.layout.host.to_string(),
            })?;
        let origin = file.path.display().to_string();
        debug!(path = %origin, "reading secret file");

        let content = fs::read_to_string(&file.path)?;
        let envelope = Envelope::parse(&content, &origin)?;
        if envelope.certificate != file.subject() {
            return Err(ContentError::Malformed {
                path: origin,
                reason: format!(
                    "sealed for {} but named for {}",
                    envelope.certificate,
                    file.subject()
                ),
            }
            .into());
        }

        let certificate = self
            .store
            .get(&envelope.certificate)?
            .ok_or_else(|| NotFoundError::Certificate {
                identity: identity.to_string(),
                host: self.layout.host.to_string(),
            })?;
        if certificate.thumbprint != envelope.thumbprint {
            return Err(ContentError::Malformed {
                path: origin,
                reason: "thumbprint does not match the stored certificate".to_string(),
            }
            .into());
        }

        let key = self.store.load_private_key(&certificate, &self.token)?;
        let plaintext = envelope.open(key.as_age())?;
        let credential = Credential::from_transport(&plaintext, &origin)?;

        debug!(subject = %certificate.subject, "credential unprotected");
        Ok(credential)
    }

    /// Retire an identity on this host: every secret file under the prefix
    /// and every certificate no other secret file still depends on.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Certificate` if there was nothing to remove.
    /// Invalid input is rejected before anything is deleted.
    pub fn remove(&self, identity: &str, prefix: Option<&str>) -> Result<RemoveOutcome> {
        let retention = self.prune(identity, 0, prefix)?;
        if !retention.removed_anything() && retention.is_clean() {
            return Err(NotFoundError::Certificate {
                identity: identity.to_string(),
                host: self.layout.host.to_string(),
            }
            .into());
        }
        info!(
            identity,
            certificates = retention.certificates.len(),
            files = retention.files.len(),
            "identity removed"
        );
        Ok(RemoveOutcome {
            identity: identity.to_string(),
            retention,
        })
    }

    /// Describe what is stored on this host, for one identity or all.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Certificate` if a named identity has neither
    /// certificates nor files.
    pub fn show(&self, identity: Option<&str>, prefix: Option<&str>) -> Result<ShowOutcome> {
        if let Some(id) = identity {
            validation::validate_identity(id)?;
        }

        let mut by_identity: BTreeMap<String, IdentityStatus> = BTreeMap::new();
        let entry = |name: &str| -> IdentityStatus {
            IdentityStatus {
                identity: name.to_string(),
                ..Default::default()
            }
        };

        let certificates = self.store.find(&self.layout.host, identity)?;
        for certificate in &certificates {
            by_identity
                .entry(certificate.identity.clone())
                .or_insert_with(|| entry(&certificate.identity))
                .certificates
                .push(certificate.into());
        }

        let dir = self.secret_dir(prefix)?;
        for file in SecretFile::list(&dir, &self.layout.host, identity)? {
            by_identity
                .entry(file.generation.identity.clone())
                .or_insert_with(|| entry(&file.generation.identity))
                .files
                .push(file.path);
        }

        if let Some(id) = identity {
            if by_identity.is_empty() {
                return Err(NotFoundError::Certificate {
                    identity: id.to_string(),
                    host: self.layout.host.to_string(),
                }
                .into());
            }
        }

        for status in by_identity.values_mut() {
            let Some(newest) = certificates
                .iter()
                .rev()
                .find(|c| c.identity == status.identity)
            else {
                continue;
            };
            match self
                .store
                .private_key_location(newest)
                .and_then(|location| Acl::load(&location))
            {
                Ok(acl) => status.access = acl.entries().to_vec(),
                Err(e) => warn!(subject = %newest.subject, error = %e, "cannot read access list"),
            }
        }

        Ok(ShowOutcome {
            identities: by_identity.into_values().collect(),
        })
    }
}
