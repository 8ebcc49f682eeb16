//! Cryptographic operations.
//!
//! Secrets are enveloped for a single certificate's public key: producing a
//! protected secret needs only the public half, consuming it needs the
//! access-controlled private half.
//!
//! ## Policy
//!
//! Every key pair is X25519, payloads are sealed with the age format
//! (ChaCha20-Poly1305) and certificates are identified by a SHA-512
//! thumbprint of the public key. None of this is caller-tunable.

use ::age::x25519;
use sha2::{Digest, Sha512};

mod age;
mod envelope;

pub use age::{parse_recipient, Age};
pub use envelope::Envelope;

use crate::core::types::Thumbprint;
use crate::error::Result;

/// Cryptographic backend trait.
///
/// Abstracts encryption and decryption so the codec does not depend on a
/// concrete key format.
pub trait Cipher {
    /// Type representing a recipient public key.
    type Recipient;

    /// Type representing a private key.
    type Identity;

    /// Encrypt plaintext for one recipient.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if encryption fails.
    fn encrypt(&self, plaintext: &str, recipient: &Self::Recipient) -> Result<String>;

    /// Decrypt ciphertext with a private key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` if the key does not match or
    /// the ciphertext is damaged.
    fn decrypt(&self, ciphertext: &str, identity: &Self::Identity) -> Result<String>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Hex SHA-512 digest of a public key string.
pub fn thumbprint(public_key: &str) -> Thumbprint {
    Sha512::digest(public_key.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Generate a fresh key pair, returning the private half and its public key.
pub fn generate_keypair() -> (x25519::Identity, String) {
    let identity = x25519::Identity::generate();
    let public_key = identity.to_public().to_string();
    (identity, public_key)
}
