//! cmsvault - host-local credential vault with envelope encryption.
//!
//! Credentials are sealed for the public key of a per-(identity, host)
//! certificate. Anyone may write a protected credential; reading it back
//! requires a grant on the certificate's private key.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── protect       # Encrypt a credential
//! │   ├── unprotect     # Decrypt a credential (local only)
//! │   ├── remove        # Retire an identity
//! │   ├── show          # Inspect certificates and files
//! │   ├── access        # grant / revoke / reset-access
//! │   ├── targets       # Preview fleet resolution
//! │   ├── fleet         # Per-host dispatch and reporting
//! │   ├── serve         # Remote end of fleet dispatch
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # config.toml and the loaded Context
//!     ├── cipher/       # age envelope encryption
//!     ├── directory     # Principal resolution and access tokens
//!     ├── domain/       # Certificates, credentials, principals, ACLs
//!     ├── store/        # Key store trait and filesystem implementation
//!     ├── targets       # Host and cluster resolution
//!     ├── vault/        # Issue, protect, unprotect, access, retention
//!     └── fleet/        # Request/response dispatch across hosts
//! ```

pub mod cli;
pub mod core;
pub mod error;
