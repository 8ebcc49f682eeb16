//! Certificate issuance.

use chrono::{Duration, Utc};
use tracing::{debug, info};

use super::Vault;
use crate::core::domain::{Acl, Certificate, Generation};
use crate::core::validation;
use crate::error::Result;

impl Vault {
    /// Issue a new encryption certificate for an identity on this host.
    ///
    /// The subject timestamp is strictly greater than that of every existing
    /// certificate for the pair, so two issuances never collide. The private
    /// key starts out readable by the recovery baseline and the caller.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IssuanceFailed` if the key pair cannot be
    /// created. Nothing is left behind in that case.
    pub fn issue(&self, identity: &str) -> Result<Certificate> {
        validation::validate_identity(identity)?;

        let newest = self
            .store
            .find(&self.layout.host, Some(identity))?
            .into_iter()
            .map(|c| c.created)
            .max();

        let mut created = Utc::now();
        if let Some(newest) = newest {
            if created <= newest {
                debug!(%newest, "clock did not advance past newest certificate");
                created = newest + Duration::nanoseconds(1);
            }
        }

        let generation = Generation::new(self.layout.host.clone(), identity, created);
        let acl = Acl::with_owner(self.token.user.clone());
        let certificate = self.store.create(&generation, &acl)?;

        info!(subject = %certificate.subject, "certificate issued");
        Ok(certificate)
    }
}
