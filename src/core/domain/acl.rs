//! Access control lists guarding private keys.
//!
//! The list lives next to the private key it protects (`identity.acl`), not
//! on the encrypted secret file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Sid, Token, WellKnown};
use crate::core::constants::ACL_FILE;
use crate::error::{AccessError, Result};

/// Rights held by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rights {
    Read,
    FullControl,
}

/// Entry effect. Only allow entries exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    Allow,
}

/// A single access control entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ace {
    pub sid: Sid,
    pub rights: Rights,
    pub effect: Effect,
}

impl Ace {
    pub fn allow(sid: Sid, rights: Rights) -> Self {
        Self {
            sid,
            rights,
            effect: Effect::Allow,
        }
    }
}

/// Ordered list of entries on one private key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    #[serde(default, rename = "entry")]
    entries: Vec<Ace>,
}

impl Acl {
    /// Recovery baseline: local system and administrators, full control.
    pub fn baseline() -> Self {
        Self {
            entries: vec![
                Ace::allow(WellKnown::LocalSystem.sid(), Rights::FullControl),
                Ace::allow(WellKnown::Administrators.sid(), Rights::FullControl),
            ],
        }
    }

    /// Baseline plus a full-control owner entry.
    pub fn with_owner(owner: Sid) -> Self {
        let mut acl = Self::baseline();
        if !acl.contains(&owner) {
            acl.entries.push(Ace::allow(owner, Rights::FullControl));
        }
        acl
    }

    pub fn entries(&self) -> &[Ace] {
        &self.entries
    }

    /// Whether any entry names `sid`.
    pub fn contains(&self, sid: &Sid) -> bool {
        self.entries.iter().any(|e| &e.sid == sid)
    }

    /// Add a read-only allow entry unless `sid` already has one.
    ///
    /// Returns `true` if the list changed.
    pub fn grant_read(&mut self, sid: Sid) -> bool {
        if self.contains(&sid) {
            return false;
        }
        self.entries.push(Ace::allow(sid, Rights::Read));
        true
    }

    /// Remove every allow entry for `sid`.
    ///
    /// Returns the number of entries removed.
    pub fn revoke(&mut self, sid: &Sid) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.effect == Effect::Allow && &e.sid == sid));
        before - self.entries.len()
    }

    /// Drop all entries and restore the baseline.
    pub fn reset(&mut self) {
        *self = Self::baseline();
    }

    /// Whether the caller may read the private key.
    pub fn allows_read(&self, token: &Token) -> bool {
        token.sids().any(|sid| {
            self.entries
                .iter()
                .any(|e| e.effect == Effect::Allow && &e.sid == sid)
        })
    }

    /// Location of the list guarding a private key file.
    pub fn path_for(key_location: &Path) -> PathBuf {
        key_location.with_file_name(ACL_FILE)
    }

    /// Load the list guarding a private key.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::AclRead` if the list is missing or malformed.
    pub fn load(key_location: &Path) -> Result<Self> {
        let path = Self::path_for(key_location);
        debug!(path = %path.display(), "loading access list");

        let contents = fs::read_to_string(&path).map_err(|e| AccessError::AclRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let acl = toml::from_str(&contents).map_err(|e| AccessError::AclRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(acl)
    }

    /// Replace the list guarding a private key.
    ///
    /// Writes to a temporary file first so a crash never leaves a truncated
    /// list behind.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::AclWrite` on any serialization or I/O failure.
    pub fn save(&self, key_location: &Path) -> Result<()> {
        let path = Self::path_for(key_location);
        let write_err = |reason: String| AccessError::AclWrite {
            path: path.display().to_string(),
            reason,
        };

        let contents = toml::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        let tmp = path.with_extension("acl.tmp");
        fs::write(&tmp, contents).map_err(|e| write_err(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
                .map_err(|e| write_err(e.to_string()))?;
        }

        fs::rename(&tmp, &path).map_err(|e| write_err(e.to_string()))?;
        debug!(path = %path.display(), entries = self.entries.len(), "access list saved");
        Ok(())
    }
}
