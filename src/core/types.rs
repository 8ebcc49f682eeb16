//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// An age public key string (starts with "age1...").
pub type PublicKey = String;

/// Hex-encoded SHA-512 digest of a public key.
pub type Thumbprint = String;

/// Secret directory prefix (the `cms` in `cms_<host>`).
pub type Prefix = String;

/// A principal as typed by the caller, before resolution.
pub type PrincipalInput = String;

/// Name of a cluster in the configuration.
pub type ClusterName = String;
