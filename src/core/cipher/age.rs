//! Age encryption backend.
//!
//! Encrypts to a single x25519 recipient and emits ASCII armor so secret
//! files stay text.

use std::io::{Read, Write};

use ::age::x25519;
use tracing::trace;

use super::Cipher;
use crate::error::{CipherError, Result};

/// Age-based backend using x25519 keys.
pub struct Age;

impl Cipher for Age {
    type Recipient = x25519::Recipient;
    type Identity = x25519::Identity;

    fn name(&self) -> &'static str {
        "age"
    }

    fn encrypt(&self, plaintext: &str, recipient: &x25519::Recipient) -> Result<String> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let encryptor = age::Encryptor::with_recipients(std::iter::once(
            recipient as &dyn age::Recipient,
        ))
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut armored = Vec::new();
        let armor =
            age::armor::ArmoredWriter::wrap_output(&mut armored, age::armor::Format::AsciiArmor)
                .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;
        let mut writer = encryptor
            .wrap_output(armor)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        writer
            .write_all(plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        writer
            .finish()
            .and_then(|armor| armor.finish())
            .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;

        trace!(ciphertext_len = armored.len(), "encrypted");

        String::from_utf8(armored)
            .map_err(|e| CipherError::EncryptionFailed(format!("UTF-8 error: {}", e)).into())
    }

    fn decrypt(&self, ciphertext: &str, identity: &x25519::Identity) -> Result<String> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting");

        let reader = age::armor::ArmoredReader::new(ciphertext.as_bytes());
        let decryptor = age::Decryptor::new(reader)
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        let mut reader = decryptor
            .decrypt(std::iter::once(identity as &dyn age::Identity))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        let mut plaintext = Vec::new();
        reader
            .read_to_end(&mut plaintext)
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        trace!(plaintext_len = plaintext.len(), "decrypted");

        String::from_utf8(plaintext)
            .map_err(|e| CipherError::DecryptionFailed(format!("UTF-8 error: {}", e)).into())
    }
}

/// Parse a public key string into an age recipient.
///
/// # Errors
///
/// Returns `CipherError::InvalidPublicKey` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| CipherError::InvalidPublicKey(key.to_string()).into())
}
