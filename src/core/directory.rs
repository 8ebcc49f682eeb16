//! Account directory.
//!
//! Resolves principal names to durable identifiers and builds the caller's
//! access token. Every [`PrincipalName`] variant has exactly one resolution
//! strategy, chosen in [`resolve_principal`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::core::domain::{PrincipalName, Sid, Token, WellKnown};
use crate::core::types::PrincipalInput;
use crate::error::{AccessError, Result};

/// Source of account identifiers.
pub trait Directory {
    /// Name of the local machine, used to qualify local accounts.
    fn machine(&self) -> &str;

    /// Domain bare names are qualified against when not local.
    fn default_domain(&self) -> Option<&str>;

    /// Look up an account in a domain. The local machine is a domain too.
    fn lookup(&self, domain: &str, name: &str) -> Result<Option<Sid>>;

    /// Access token of the calling process.
    fn current_token(&self) -> Result<Token>;
}

/// Resolve one principal string to an identifier.
///
/// Bare names are qualified against the local machine when `local` is set,
/// otherwise against the directory's default domain.
///
/// # Errors
///
/// Returns `AccessError::UnresolvablePrincipal` if the account does not
/// exist, or `AccessError::NoDefaultDomain` if a bare name cannot be
/// qualified.
pub fn resolve_principal(directory: &dyn Directory, input: &str, local: bool) -> Result<Sid> {
    let unresolvable = |reason: String| AccessError::UnresolvablePrincipal {
        principal: input.to_string(),
        reason,
    };

    let sid = match PrincipalName::parse(input) {
        PrincipalName::RawIdentifier(sid) => sid,
        PrincipalName::WellKnown(wk) => wk.sid(),
        PrincipalName::DomainQualified { domain, name } => directory
            .lookup(&domain, &name)?
            .ok_or_else(|| unresolvable(format!("no account '{}' in domain '{}'", name, domain)))?,
        PrincipalName::Bare(name) if name.is_empty() => {
            return Err(unresolvable("empty name".to_string()).into());
        }
        PrincipalName::Bare(name) => {
            let domain = if local {
                directory.machine().to_string()
            } else {
                directory
                    .default_domain()
                    .map(str::to_string)
                    .ok_or_else(|| AccessError::NoDefaultDomain(name.clone()))?
            };
            directory
                .lookup(&domain, &name)?
                .ok_or_else(|| unresolvable(format!("no account '{}' in domain '{}'", name, domain)))?
        }
    };

    debug!(principal = input, sid = %sid, "principal resolved");
    Ok(sid)
}

/// Resolve every principal, failing on the first one that does not resolve.
pub fn resolve_principals(
    directory: &dyn Directory,
    inputs: &[PrincipalInput],
    local: bool,
) -> Result<Vec<Sid>> {
    inputs
        .iter()
        .map(|p| resolve_principal(directory, p, local))
        .collect()
}

/// One line of a passwd file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PasswdEntry {
    name: String,
    uid: u32,
    gid: u32,
}

/// One line of a group file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupEntry {
    name: String,
    gid: u32,
    members: Vec<String>,
}

fn parse_passwd(contents: &str) -> Vec<PasswdEntry> {
    contents
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 4 {
                trace!(line, "skipping malformed passwd line");
                return None;
            }
            Some(PasswdEntry {
                name: fields[0].to_string(),
                uid: fields[2].parse().ok()?,
                gid: fields[3].parse().ok()?,
            })
        })
        .collect()
}

fn parse_group(contents: &str) -> Vec<GroupEntry> {
    contents
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 3 {
                trace!(line, "skipping malformed group line");
                return None;
            }
            let members = fields
                .get(3)
                .map(|m| {
                    m.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(GroupEntry {
                name: fields[0].to_string(),
                gid: fields[2].parse().ok()?,
                members,
            })
        })
        .collect()
}

/// Directory backed by the local account database and a static table of
/// domain accounts.
#[derive(Debug, Clone)]
pub struct SystemDirectory {
    machine: String,
    default_domain: Option<String>,
    passwd: PathBuf,
    group: PathBuf,
    accounts: BTreeMap<String, BTreeMap<String, Sid>>,
    user: Option<String>,
}

impl SystemDirectory {
    pub fn new(machine: impl Into<String>, passwd: impl Into<PathBuf>, group: impl Into<PathBuf>) -> Self {
        Self {
            machine: machine.into(),
            default_domain: None,
            passwd: passwd.into(),
            group: group.into(),
            accounts: BTreeMap::new(),
            user: None,
        }
    }

    pub fn with_default_domain(mut self, domain: Option<String>) -> Self {
        self.default_domain = domain;
        self
    }

    /// Add domain accounts. Domain and account names match case-insensitively.
    pub fn with_accounts(mut self, accounts: &BTreeMap<String, BTreeMap<String, Sid>>) -> Self {
        for (domain, names) in accounts {
            let table = self.accounts.entry(domain.to_lowercase()).or_default();
            for (name, sid) in names {
                table.insert(name.to_lowercase(), sid.clone());
            }
        }
        self
    }

    /// Act as a specific local user instead of the process owner.
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    fn is_local(&self, domain: &str) -> bool {
        domain == "." || domain.eq_ignore_ascii_case(&self.machine)
    }

    fn read(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| {
            AccessError::UnresolvablePrincipal {
                principal: path.display().to_string(),
                reason: format!("cannot read account database: {}", e),
            }
            .into()
        })
    }

    fn users(&self) -> Result<Vec<PasswdEntry>> {
        Ok(parse_passwd(&Self::read(&self.passwd)?))
    }

    fn groups(&self) -> Result<Vec<GroupEntry>> {
        if !self.group.exists() {
            return Ok(Vec::new());
        }
        Ok(parse_group(&Self::read(&self.group)?))
    }

    fn lookup_local(&self, name: &str) -> Result<Option<Sid>> {
        if let Some(user) = self.users()?.into_iter().find(|u| u.name == name) {
            return Ok(Some(Sid::unix_user(user.uid)));
        }
        let group = self.groups()?.into_iter().find(|g| g.name == name);
        Ok(group.map(|g| Sid::unix_group(g.gid)))
    }
}

impl Directory for SystemDirectory {
    fn machine(&self) -> &str {
        &self.machine
    }

    fn default_domain(&self) -> Option<&str> {
        self.default_domain.as_deref()
    }

    fn lookup(&self, domain: &str, name: &str) -> Result<Option<Sid>> {
        trace!(domain, name, "account lookup");
        if self.is_local(domain) {
            return self.lookup_local(name);
        }
        Ok(self
            .accounts
            .get(&domain.to_lowercase())
            .and_then(|table| table.get(&name.to_lowercase()))
            .cloned())
    }

    fn current_token(&self) -> Result<Token> {
        let username = match &self.user {
            Some(user) => user.clone(),
            None => whoami::username(),
        };

        let user = self
            .users()?
            .into_iter()
            .find(|u| u.name == username)
            .ok_or_else(|| AccessError::UnresolvablePrincipal {
                principal: username.clone(),
                reason: format!("not present in {}", self.passwd.display()),
            })?;

        let mut groups = vec![Sid::unix_group(user.gid)];
        for group in self.groups()? {
            if group.gid != user.gid && group.members.iter().any(|m| m == &username) {
                groups.push(Sid::unix_group(group.gid));
            }
        }
        if user.uid == 0 {
            groups.push(WellKnown::LocalSystem.sid());
            groups.push(WellKnown::Administrators.sid());
        }

        debug!(user = %username, groups = groups.len(), "access token built");
        Ok(Token::new(Sid::unix_user(user.uid), groups))
    }
}
