//! Constants used throughout cmsvault.
//!
//! Centralizes magic strings, file names and policy values.

/// Default per-machine application-data root holding secret files.
pub const DEFAULT_PARENT_PATH: &str = "/var/lib/cmsvault";

/// Default secret directory prefix (`<prefix>_<host>`).
pub const DEFAULT_PREFIX: &str = "cms";

/// Key store directory name relative to the parent path.
pub const KEY_STORE_DIR: &str = "keys";

/// Configuration directory name under the user config dir.
pub const CONFIG_DIR: &str = "cmsvault";

/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV: &str = "CMSVAULT_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CMSVAULT_LOG";

/// Extension of encrypted secret files.
pub const SECRET_FILE_EXTENSION: &str = "txt";

/// Prefix of certificate subjects.
pub const SUBJECT_PREFIX: &str = "CN=";

/// Subject timestamp format: UTC seconds followed by nine nanosecond digits.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%9f";

/// Length of a formatted subject timestamp.
pub const TIMESTAMP_LEN: usize = 23;

/// Certificate validity. Rotation is driven by reset, not expiry.
pub const VALIDITY_YEARS: i32 = 100;

/// Asymmetric key algorithm used for every issued key pair.
pub const KEY_ALGORITHM: &str = "x25519";

/// Digest used for certificate thumbprints.
pub const THUMBPRINT_ALGORITHM: &str = "sha512";

/// Private key file inside a certificate directory.
pub const KEY_FILE: &str = "identity.key";

/// Certificate metadata file inside a certificate directory.
pub const CERTIFICATE_FILE: &str = "certificate.toml";

/// Access list file guarding the private key.
pub const ACL_FILE: &str = "identity.acl";

/// Secret file envelope version tag.
pub const ENVELOPE_VERSION: &str = "cmsvault-envelope-v1";

/// Generations kept after a successful protect.
pub const DEFAULT_KEEP: usize = 1;

/// Longest accepted identity.
pub const MAX_IDENTITY_LEN: usize = 64;

/// Default ssh binary for remote dispatch.
pub const DEFAULT_SSH: &str = "ssh";

/// Default command invoked on remote hosts.
pub const DEFAULT_REMOTE_COMMAND: &str = "cmsvault";

/// Default remote connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default remote execution timeout in seconds.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 120;
