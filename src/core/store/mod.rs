//! Key store adapter.
//!
//! Abstracts the platform's asymmetric key store: create a key pair with its
//! certificate record, enumerate certificates, locate a private key, release
//! a private key to an authorised caller, delete a key pair.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `KeyStore` trait
//! 2. Add the implementation in a new file (e.g., `tpm.rs`, `hsm.rs`)
//! 3. Re-export from this module

use std::path::PathBuf;

use crate::core::domain::{Acl, Certificate, Generation, Host, Token};
use crate::error::Result;

mod fs;
mod private_key;

pub use fs::Filesystem;
pub use private_key::PrivateKey;

/// Asymmetric key store.
///
/// Private keys never leave the store in exportable form: the only way to
/// use one is [`KeyStore::load_private_key`], which checks the caller's
/// token against the key's access list first.
pub trait KeyStore {
    /// Create a non-exportable key pair for a generation.
    ///
    /// Creation is all-or-nothing: on failure nothing is left behind.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IssuanceFailed` if the key pair cannot be created.
    fn create(&self, generation: &Generation, acl: &Acl) -> Result<Certificate>;

    /// Enumerate certificates of a host, optionally for one identity,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn find(&self, host: &Host, identity: Option<&str>) -> Result<Vec<Certificate>>;

    /// Look up a certificate by subject.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn get(&self, subject: &str) -> Result<Option<Certificate>>;

    /// Storage location of a certificate's private key.
    ///
    /// # Errors
    ///
    /// Returns `NotFoundError::CertificateSubject` if the key is gone.
    fn private_key_location(&self, certificate: &Certificate) -> Result<PathBuf>;

    /// Release the private key to a caller holding a grant on it.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::Denied` if no identifier in `token` holds an
    /// allow entry.
    fn load_private_key(&self, certificate: &Certificate, token: &Token) -> Result<PrivateKey>;

    /// Delete a key pair and its certificate record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if deletion fails.
    fn delete(&self, certificate: &Certificate) -> Result<()>;
}
