//! Access control on private keys.
//!
//! Grants and revocations always target the current certificate of an
//! identity. Principals are resolved before the list is touched, so an
//! unresolvable name leaves the list as it was.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Vault;
use crate::core::directory;
use crate::core::domain::{Acl, Sid};
use crate::core::types::PrincipalInput;
use crate::error::{NotFoundError, Result, ValidationError};

/// Kind of access list update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    Grant,
    Revoke,
    Reset,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grant => "grant",
            Self::Revoke => "revoke",
            Self::Reset => "reset",
        })
    }
}

/// Result of an access list update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessOutcome {
    pub mode: AccessMode,
    /// Subject of the certificate whose key was updated
    pub certificate: String,
    pub key_location: PathBuf,
    /// Identifiers that gained an entry
    pub added: Vec<Sid>,
    /// Identifiers that lost their entries
    pub removed: Vec<Sid>,
}

impl AccessOutcome {
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

impl Vault {
    /// Update the access list on the current certificate's private key.
    ///
    /// `principals` are ignored for [`AccessMode::Reset`]. Bare principal
    /// names are qualified against the local machine when `local` is set,
    /// otherwise against the default domain.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::Certificate` if the identity has never been
    /// protected on this host and `AccessError::UnresolvablePrincipal` if any
    /// principal does not resolve.
    pub fn update_access(
        &self,
        mode: AccessMode,
        identity: &str,
        principals: &[PrincipalInput],
        local: bool,
    ) -> Result<AccessOutcome> {
        let certificate = self
            .current_certificate(identity)?
            .ok_or_else(|| NotFoundError::Certificate {
                identity: identity.to_string(),
                host: self.layout.host.to_string(),
            })?;
        let key_location = self.store.private_key_location(&certificate)?;
        debug!(mode = %mode, subject = %certificate.subject, "updating access list");

        let sids = match mode {
            AccessMode::Reset => Vec::new(),
            AccessMode::Grant | AccessMode::Revoke => {
                if principals.is_empty() {
                    return Err(ValidationError::NoPrincipals.into());
                }
                directory::resolve_principals(self.directory.as_ref(), principals, local)?
            }
        };

        let mut acl = Acl::load(&key_location)?;
        let before = acl.clone();
        let mut added = Vec::new();
        let mut removed = Vec::new();

        match mode {
            AccessMode::Grant => {
                for sid in sids {
                    if acl.grant_read(sid.clone()) {
                        added.push(sid);
                    }
                }
            }
            AccessMode::Revoke => {
                for sid in sids {
                    if acl.revoke(&sid) > 0 {
                        removed.push(sid);
                    }
                }
            }
            AccessMode::Reset => {
                acl.reset();
                for entry in before.entries() {
                    if !acl.contains(&entry.sid) && !removed.contains(&entry.sid) {
                        removed.push(entry.sid.clone());
                    }
                }
                for entry in acl.entries() {
                    if !before.contains(&entry.sid) {
                        added.push(entry.sid.clone());
                    }
                }
            }
        }

        if acl != before {
            acl.save(&key_location)?;
        }

        info!(
            mode = %mode,
            subject = %certificate.subject,
            added = added.len(),
            removed = removed.len(),
            "access list updated"
        );
        Ok(AccessOutcome {
            mode,
            certificate: certificate.subject,
            key_location,
            added,
            removed,
        })
    }

    /// Give principals read access to an identity's private key.
    pub fn grant(
        &self,
        identity: &str,
        principals: &[PrincipalInput],
        local: bool,
    ) -> Result<AccessOutcome> {
        self.update_access(AccessMode::Grant, identity, principals, local)
    }

    /// Take away every entry the principals hold on an identity's private key.
    pub fn revoke(
        &self,
        identity: &str,
        principals: &[PrincipalInput],
        local: bool,
    ) -> Result<AccessOutcome> {
        self.update_access(AccessMode::Revoke, identity, principals, local)
    }

    /// Restore the recovery baseline on an identity's private key.
    pub fn reset_access(&self, identity: &str) -> Result<AccessOutcome> {
        self.update_access(AccessMode::Reset, identity, &[], false)
    }
}
