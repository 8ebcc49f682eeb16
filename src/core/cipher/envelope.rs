//! Secret file envelope.
//!
//! A secret file holds a small JSON document naming the certificate whose
//! public key sealed it, plus the armored ciphertext.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::{parse_recipient, Age, Cipher};
use crate::core::constants::ENVELOPE_VERSION;
use crate::core::domain::Certificate;
use crate::core::types::Thumbprint;
use crate::error::{ContentError, Result};

/// Encrypted credential bound to one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    version: String,
    /// Subject of the certificate that sealed this envelope
    pub certificate: String,
    /// Thumbprint of that certificate's public key
    pub thumbprint: Thumbprint,
    /// age-armored ciphertext
    pub ciphertext: String,
}

impl Envelope {
    /// Encrypt plaintext under a certificate's public key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if the public key is invalid or encryption fails.
    pub fn seal(plaintext: &str, certificate: &Certificate) -> Result<Self> {
        let recipient = parse_recipient(&certificate.public_key)?;
        debug!(backend = Age.name(), subject = %certificate.subject, "sealing");
        let ciphertext = Age.encrypt(plaintext, &recipient)?;
        Ok(Self {
            version: ENVELOPE_VERSION.to_string(),
            certificate: certificate.subject.clone(),
            thumbprint: certificate.thumbprint.clone(),
            ciphertext,
        })
    }

    /// Decrypt with the private key of the sealing certificate.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` if the key does not match.
    pub fn open(&self, identity: &age::x25519::Identity) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(Age.decrypt(&self.ciphertext, identity)?))
    }

    /// Serialize for writing to disk.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse file content.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Malformed` if the content is not an envelope
    /// of a supported version.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let envelope: Self = serde_json::from_str(content).map_err(|e| ContentError::Malformed {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(ContentError::Malformed {
                path: origin.to_string(),
                reason: format!("unsupported envelope version '{}'", envelope.version),
            }
            .into());
        }
        Ok(envelope)
    }
}
