//! Generation retention.
//!
//! Secret files are pruned first, then certificates. A certificate is only
//! deleted once no secret file on this host, under any prefix, was sealed
//! for it. Everything that can fail with an error runs before the first
//! deletion; a failed deletion is recorded and the pass carries on.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Vault;
use crate::core::domain::SecretFile;
use crate::core::validation;
use crate::error::{Error, Result, RetentionError};

/// What a pruning run removed and what it failed to remove.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionReport {
    pub certificates: Vec<String>,
    pub files: Vec<PathBuf>,
    pub failures: Vec<RetentionError>,
}

impl RetentionReport {
    /// Report for a run that could not start.
    pub fn skipped(error: &Error) -> Self {
        Self {
            failures: vec![RetentionError::Skipped {
                reason: error.to_string(),
            }],
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn removed_anything(&self) -> bool {
        !self.certificates.is_empty() || !self.files.is_empty()
    }
}

impl Vault {
    /// Remove all but the `keep` newest secret files for an identity under
    /// a prefix, and all but the `keep` newest certificates that no
    /// remaining secret file depends on. `keep = 0` removes everything.
    ///
    /// With a prefix other than the configured one, only certificates that
    /// had a file under that prefix are considered.
    ///
    /// # Errors
    ///
    /// Validation and enumeration failures are errors and leave everything
    /// in place. Individual deletions that fail end up in
    /// [`RetentionReport::failures`].
    pub fn prune(&self, identity: &str, keep: usize, prefix: Option<&str>) -> Result<RetentionReport> {
        validation::validate_identity(identity)?;
        let dir = self.secret_dir(prefix)?;
        let files = SecretFile::list(&dir, &self.layout.host, Some(identity))?;
        let mut sealed_for = self.sealed_elsewhere(identity, &dir)?;
        let certificates = self.store.find(&self.layout.host, Some(identity))?;
        let scoped = prefix.is_some_and(|p| p != self.layout.prefix);

        let mut report = RetentionReport::default();

        let excess = files.len().saturating_sub(keep);
        for file in &files[..excess] {
            match fs::remove_file(&file.path) {
                Ok(()) => {
                    debug!(path = %file.path.display(), "secret file pruned");
                    report.files.push(file.path.clone());
                }
                Err(e) => {
                    let failure = RetentionError::DeleteFile {
                        path: file.path.display().to_string(),
                        reason: e.to_string(),
                    };
                    warn!("{}", failure);
                    report.failures.push(failure);
                    sealed_for.insert(file.subject());
                }
            }
        }
        sealed_for.extend(files[excess..].iter().map(SecretFile::subject));
        let had_files: BTreeSet<String> = files.iter().map(SecretFile::subject).collect();

        let excess = certificates.len().saturating_sub(keep);
        for certificate in &certificates[..excess] {
            if sealed_for.contains(&certificate.subject) {
                debug!(subject = %certificate.subject, "certificate still in use");
                continue;
            }
            if scoped && !had_files.contains(&certificate.subject) {
                continue;
            }
            match self.store.delete(certificate) {
                Ok(()) => {
                    debug!(subject = %certificate.subject, "certificate pruned");
                    report.certificates.push(certificate.subject.clone());
                }
                Err(e) => {
                    let failure = RetentionError::DeleteCertificate {
                        subject: certificate.subject.clone(),
                        reason: e.to_string(),
                    };
                    warn!("{}", failure);
                    report.failures.push(failure);
                }
            }
        }

        Ok(report)
    }

    /// Subjects of the certificates an identity's files were sealed for,
    /// across every secret directory of this host except `skip`.
    fn sealed_elsewhere(&self, identity: &str, skip: &Path) -> Result<BTreeSet<String>> {
        let mut subjects = BTreeSet::new();
        let parent = &self.layout.parent_path;
        if !parent.exists() {
            return Ok(subjects);
        }

        let suffix = format!("_{}", self.layout.host);
        for entry in fs::read_dir(parent)? {
            let entry = entry?;
            let path = entry.path();
            let is_secret_dir = entry.file_type()?.is_dir()
                && entry.file_name().to_string_lossy().ends_with(&suffix);
            if !is_secret_dir || path == skip {
                continue;
            }
            for file in SecretFile::list(&path, &self.layout.host, Some(identity))? {
                subjects.insert(file.subject());
            }
        }
        Ok(subjects)
    }
}
