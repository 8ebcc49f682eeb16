//! Security principals.
//!
//! Principals reach the vault as free-form strings. [`PrincipalName::parse`]
//! turns them into a tagged variant once, and every variant has exactly one
//! resolution strategy (see `core::directory`). The durable form is a
//! [`Sid`] in the textual `S-1-...` notation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Durable security identifier, robust to renames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sid(String);

/// Identifier authority used for Unix user accounts.
const UNIX_USER_AUTHORITY: &str = "S-1-22-1";

/// Identifier authority used for Unix groups.
const UNIX_GROUP_AUTHORITY: &str = "S-1-22-2";

impl Sid {
    /// Parse a textual identifier (`S-1-<authority>-<sub>...`).
    ///
    /// Returns `None` if the string is not an identifier.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let mut parts = s.split('-');
        let head = parts.next()?;
        if !head.eq_ignore_ascii_case("S") {
            return None;
        }
        if parts.next()? != "1" {
            return None;
        }
        let rest: Vec<&str> = parts.collect();
        if rest.len() < 2 {
            return None;
        }
        if !rest
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }
        Some(Self(format!("S-1-{}", rest.join("-"))))
    }

    /// Identifier of a Unix user.
    pub fn unix_user(uid: u32) -> Self {
        Self(format!("{}-{}", UNIX_USER_AUTHORITY, uid))
    }

    /// Identifier of a Unix group.
    pub fn unix_group(gid: u32) -> Self {
        Self(format!("{}-{}", UNIX_GROUP_AUTHORITY, gid))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Sid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not a security identifier: {}", s))
    }
}

impl TryFrom<String> for Sid {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sid> for String {
    fn from(sid: Sid) -> Self {
        sid.0
    }
}

/// Built-in principals with fixed identifiers.
///
/// `EnterpriseDomainControllers` only resolves by name on a domain
/// controller, so it is always mapped here instead of looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    LocalSystem,
    Administrators,
    EnterpriseDomainControllers,
    AuthenticatedUsers,
    Everyone,
}

impl WellKnown {
    const ALL: [WellKnown; 5] = [
        Self::LocalSystem,
        Self::Administrators,
        Self::EnterpriseDomainControllers,
        Self::AuthenticatedUsers,
        Self::Everyone,
    ];

    /// Fixed identifier.
    pub fn sid(self) -> Sid {
        let s = match self {
            Self::LocalSystem => "S-1-5-18",
            Self::Administrators => "S-1-5-32-544",
            Self::EnterpriseDomainControllers => "S-1-5-9",
            Self::AuthenticatedUsers => "S-1-5-11",
            Self::Everyone => "S-1-1-0",
        };
        Sid(s.to_string())
    }

    /// Accepted spellings, lower case.
    fn names(self) -> &'static [&'static str] {
        match self {
            Self::LocalSystem => &["system", "localsystem", "nt authority\\system"],
            Self::Administrators => &["administrators", "builtin\\administrators"],
            Self::EnterpriseDomainControllers => &[
                "enterprise domain controllers",
                "nt authority\\enterprise domain controllers",
            ],
            Self::AuthenticatedUsers => {
                &["authenticated users", "nt authority\\authenticated users"]
            }
            Self::Everyone => &["everyone"],
        }
    }

    /// Match a name case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|wk| wk.names().contains(&lower.as_str()))
    }
}

/// A principal as given by the caller, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalName {
    /// Already a durable identifier.
    RawIdentifier(Sid),
    /// Built-in name with a fixed identifier.
    WellKnown(WellKnown),
    /// `DOMAIN\name` or `name@domain`.
    DomainQualified { domain: String, name: String },
    /// Plain account name, qualified later.
    Bare(String),
}

impl PrincipalName {
    /// Classify a principal string, in priority order: raw identifier,
    /// well-known name, domain-qualified name, bare name.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if let Some(sid) = Sid::parse(input) {
            return Self::RawIdentifier(sid);
        }

        if let Some(wk) = WellKnown::from_name(input) {
            return Self::WellKnown(wk);
        }

        if let Some((domain, name)) = input.split_once('\\') {
            if !domain.is_empty() && !name.is_empty() {
                return Self::DomainQualified {
                    domain: domain.to_string(),
                    name: name.to_string(),
                };
            }
        }

        if let Some((name, domain)) = input.rsplit_once('@') {
            if !domain.is_empty() && !name.is_empty() {
                return Self::DomainQualified {
                    domain: domain.to_string(),
                    name: name.to_string(),
                };
            }
        }

        Self::Bare(input.to_string())
    }
}

/// The caller's principal set, used for access checks on private keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub user: Sid,
    #[serde(default)]
    pub groups: Vec<Sid>,
}

impl Token {
    pub fn new(user: Sid, groups: Vec<Sid>) -> Self {
        Self { user, groups }
    }

    /// All identifiers the caller acts as.
    pub fn sids(&self) -> impl Iterator<Item = &Sid> {
        std::iter::once(&self.user).chain(self.groups.iter())
    }
}
