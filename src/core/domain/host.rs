//! Host names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, ValidationError};

/// A target host, normalised to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Host(String);

impl Host {
    /// Parse and normalise a host name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidHost` for empty names or names with
    /// characters other than letters, digits, `-`, `_` and `.`.
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidHost {
                host: name.to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Err(ValidationError::InvalidHost {
                host: name.to_string(),
                reason: "cannot start with '.' or '-'".to_string(),
            }
            .into());
        }
        if let Some(ch) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.'))
        {
            return Err(ValidationError::InvalidHost {
                host: name.to_string(),
                reason: format!("invalid character '{}'", ch),
            }
            .into());
        }
        Ok(Self(name.to_ascii_lowercase()))
    }

    /// Name of the machine this process runs on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHostName` if the OS does not report one.
    pub fn local() -> Result<Self> {
        let name = whoami::fallible::hostname().map_err(|_| ConfigError::NoHostName)?;
        Self::new(&name)
    }

    /// Normalised name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Host {
    type Error = crate::error::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Host> for String {
    fn from(host: Host) -> Self {
        host.0
    }
}
