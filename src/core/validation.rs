//! Input validation for vault operations.
//!
//! Validates identities, prefixes and credentials before anything touches
//! the key store or the filesystem.

use crate::core::constants::MAX_IDENTITY_LEN;
use crate::error::{Result, ValidationError};

/// Validate an identity name.
///
/// Identities become part of certificate subjects and file names:
/// - Only ASCII letters, digits, `-`, `_`, `.` and `@`
/// - Cannot start with `.` or `-`
/// - Cannot be empty or longer than 64 characters
///
/// # Errors
///
/// Returns `ValidationError` if the identity is invalid.
pub fn validate_identity(identity: &str) -> Result<()> {
    if identity.is_empty() {
        return Err(ValidationError::EmptyIdentity.into());
    }

    if identity.len() > MAX_IDENTITY_LEN {
        return Err(ValidationError::InvalidIdentity {
            identity: identity.to_string(),
            reason: format!("longer than {} characters", MAX_IDENTITY_LEN),
        }
        .into());
    }

    if identity.starts_with('.') || identity.starts_with('-') {
        return Err(ValidationError::InvalidIdentity {
            identity: identity.to_string(),
            reason: "cannot start with '.' or '-'".to_string(),
        }
        .into());
    }

    for (i, ch) in identity.chars().enumerate() {
        if !is_name_char(ch) {
            return Err(ValidationError::InvalidIdentity {
                identity: identity.to_string(),
                reason: format!(
                    "invalid character '{}' at position {}. Only A-Z, a-z, 0-9, '-', '_', '.' and '@' are allowed",
                    ch,
                    i + 1
                ),
            }
            .into());
        }
    }

    Ok(())
}

/// Validate a secret directory prefix.
///
/// # Errors
///
/// Returns `ValidationError::InvalidPrefix` if the prefix is empty or
/// contains anything but letters, digits, `-` and `_`.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(ValidationError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "cannot be empty".to_string(),
        }
        .into());
    }

    if let Some(ch) = prefix
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(ValidationError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: format!("invalid character '{}'", ch),
        }
        .into());
    }

    Ok(())
}

/// Validate credential parts before encryption.
///
/// # Errors
///
/// Returns `ValidationError` if the username or the secret is empty.
pub fn validate_credential(username: &str, secret: &str) -> Result<()> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername.into());
    }
    if secret.is_empty() {
        return Err(ValidationError::EmptySecret.into());
    }
    Ok(())
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '@')
}

/// Validate file permissions (Unix only).
///
/// Checks that a file has the expected permissions mode.
///
/// # Errors
///
/// Returns `ValidationError::InvalidPermissions` if permissions don't match.
#[cfg(unix)]
pub fn validate_file_permissions(path: &std::path::Path, expected_mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    let actual_mode = metadata.permissions().mode() & 0o777;

    if actual_mode != expected_mode {
        return Err(ValidationError::InvalidPermissions {
            path: path.display().to_string(),
            expected: format!("{:o}", expected_mode),
            actual: format!("{:o}", actual_mode),
        }
        .into());
    }

    Ok(())
}
