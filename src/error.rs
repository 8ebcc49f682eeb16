//! Error types for cmsvault.
//!
//! One top-level [`Error`] wraps a focused error enum per subsystem. Every
//! error maps onto a user-visible [`ErrorKind`] so fleet reports can name the
//! failure category for each host.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Retention(#[from] RetentionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Failure reported by a remote host, already categorised over there.
    #[error("{host}: {message}")]
    Remote {
        host: String,
        kind: ErrorKind,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// User-visible failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Store(StoreError::IssuanceFailed(_)) => ErrorKind::Issuance,
            Self::Store(_) => ErrorKind::Io,
            Self::Cipher(_) => ErrorKind::Crypto,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Access(AccessError::Denied { .. }) => ErrorKind::AccessDenied,
            Self::Access(_) => ErrorKind::AccessControl,
            Self::Content(_) => ErrorKind::ContentInvalid,
            Self::Retention(_) => ErrorKind::Io,
            Self::Transport(_) => ErrorKind::Connection,
            Self::Remote { kind, .. } => *kind,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::ContentInvalid,
            Self::Prompt(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Io,
        }
    }
}

/// Failure categories surfaced per target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Connection,
    NotFound,
    AccessDenied,
    ContentInvalid,
    Resolution,
    Issuance,
    Crypto,
    AccessControl,
    Configuration,
    Validation,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connection => "connection",
            Self::NotFound => "not-found",
            Self::AccessDenied => "access-denied",
            Self::ContentInvalid => "content-invalid",
            Self::Resolution => "resolution",
            Self::Issuance => "issuance",
            Self::Crypto => "crypto",
            Self::AccessControl => "access-control",
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unable to determine local host name")]
    NoHostName,
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("identity cannot be empty")]
    EmptyIdentity,

    #[error("invalid identity '{identity}': {reason}")]
    InvalidIdentity { identity: String, reason: String },

    #[error("invalid host name '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("invalid prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("secret cannot be empty")]
    EmptySecret,

    #[error("no principals given")]
    NoPrincipals,

    #[error("insecure permissions on {path}: expected {expected}, found {actual}")]
    InvalidPermissions {
        path: String,
        expected: String,
        actual: String,
    },
}

/// Target resolution errors. Never fatal to a dispatch as a whole.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("cluster not found: {0}")]
    UnknownCluster(String),

    #[error("local host {0} is not a member of any cluster")]
    NotClustered(String),
}

/// Key store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("key pair issuance failed: {0}")]
    IssuanceFailed(String),

    #[error("failed to read key store: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write key store: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("invalid private key format: {0}")]
    InvalidFormat(String),

    #[error("invalid certificate record {path}: {reason}")]
    InvalidRecord { path: String, reason: String },
}

/// Encryption and decryption errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("armor failed: {0}")]
    ArmorFailed(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Nothing matches the requested (identity, host).
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("no certificate found for '{identity}' on {host}")]
    Certificate { identity: String, host: String },

    #[error("certificate {0} no longer exists")]
    CertificateSubject(String),

    #[error("no protected credential found for '{identity}' on {host}")]
    SecretFile { identity: String, host: String },
}

/// Access-control errors.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("access denied: caller holds no grant on the private key of {certificate}")]
    Denied { certificate: String },

    #[error("unable to resolve principal '{principal}': {reason}")]
    UnresolvablePrincipal { principal: String, reason: String },

    #[error("no default domain configured to qualify '{0}' (use --local or DOMAIN\\name)")]
    NoDefaultDomain(String),

    #[error("failed to read access list {path}: {reason}")]
    AclRead { path: String, reason: String },

    #[error("failed to write access list {path}: {reason}")]
    AclWrite { path: String, reason: String },
}

/// Decrypted or stored content does not have the expected shape.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("credential is missing field '{0}'")]
    MissingField(&'static str),

    #[error("malformed content in {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Best-effort cleanup failures.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RetentionError {
    #[error("failed to delete certificate {subject}: {reason}")]
    DeleteCertificate { subject: String, reason: String },

    #[error("failed to delete file {path}: {reason}")]
    DeleteFile { path: String, reason: String },

    #[error("retention skipped: {reason}")]
    Skipped { reason: String },
}

/// Remote execution failures.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("remote transport unavailable: {0}")]
    Unavailable(String),

    #[error("connection to {host} failed: {reason}")]
    ConnectionFailed { host: String, reason: String },

    #[error("{host} did not answer within {seconds}s")]
    Timeout { host: String, seconds: u64 },

    #[error("remote command on {host} exited with status {status}: {stderr}")]
    RemoteExit {
        host: String,
        status: i32,
        stderr: String,
    },

    #[error("protocol error talking to {host}: {reason}")]
    Protocol { host: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
