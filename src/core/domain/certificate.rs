//! Certificate and generation records.
//!
//! A generation is one issuance for an (identity, host) pair. Its name is
//! `<host>-<identity>-<timestamp>` and it is shared by the certificate
//! subject (`CN=<name>`) and the secret file (`<name>.txt`). Ordering always
//! uses the typed `created` field, never the name.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::Host;
use crate::core::constants::{SUBJECT_PREFIX, TIMESTAMP_FORMAT, TIMESTAMP_LEN};
use crate::core::types::{PublicKey, Thumbprint};
use crate::core::validation;

/// One issuance for an (identity, host) pair.
///
/// Field order matters: the derived `Ord` sorts by creation time first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation {
    pub created: DateTime<Utc>,
    pub host: Host,
    pub identity: String,
}

impl Generation {
    pub fn new(host: Host, identity: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            created,
            host,
            identity: identity.into(),
        }
    }

    /// `<host>-<identity>-<timestamp>`
    pub fn name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.host,
            self.identity,
            format_timestamp(&self.created)
        )
    }

    /// `CN=<name>`
    pub fn subject(&self) -> String {
        format!("{}{}", SUBJECT_PREFIX, self.name())
    }

    /// Parse a generation name for a known host.
    ///
    /// Returns `None` for names that belong to another host, carry no valid
    /// timestamp, or embed an invalid identity. A name for `db` never
    /// matches `db-svc` because the remainder must be exactly a timestamp.
    pub fn parse(name: &str, host: &Host) -> Option<Self> {
        let rest = name.strip_prefix(host.as_str())?.strip_prefix('-')?;
        if rest.len() < TIMESTAMP_LEN + 2 {
            return None;
        }
        let split = rest.len() - TIMESTAMP_LEN;
        let (identity, timestamp) = rest.split_at(split);
        let identity = identity.strip_suffix('-')?;
        validation::validate_identity(identity).ok()?;
        let created = parse_timestamp(timestamp)?;
        Some(Self::new(host.clone(), identity, created))
    }

    /// Whether this generation belongs to the given pair.
    pub fn is_for(&self, identity: &str, host: &Host) -> bool {
        self.identity == identity && &self.host == host
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Format a subject timestamp (23 digits, UTC, nanosecond precision).
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a subject timestamp produced by [`format_timestamp`].
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.len() != TIMESTAMP_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num = |from: usize, to: usize| s[from..to].parse::<u32>().ok();
    let year = s[0..4].parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(4, 6)?, num(6, 8)?)?;
    let time = NaiveTime::from_hms_nano_opt(num(8, 10)?, num(10, 12)?, num(12, 14)?, num(14, 23)?)?;
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

/// What a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyUsage {
    /// Encryption only. No signing, no TLS.
    DataEncipherment,
}

/// Public metadata of an issued key pair.
///
/// Never carries private key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub subject: String,
    pub host: Host,
    pub identity: String,
    pub created: DateTime<Utc>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub key_usage: KeyUsage,
    pub exportable: bool,
    pub algorithm: String,
    pub public_key: PublicKey,
    pub thumbprint: Thumbprint,
}

impl Certificate {
    /// Subject without the `CN=` prefix; also the secret file stem.
    pub fn name(&self) -> &str {
        self.subject
            .strip_prefix(SUBJECT_PREFIX)
            .unwrap_or(&self.subject)
    }

    /// Generation this certificate was issued for.
    pub fn generation(&self) -> Generation {
        Generation::new(self.host.clone(), self.identity.clone(), self.created)
    }

    /// Whether `at` falls inside the validity window.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at < self.not_after
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.subject)
    }
}
