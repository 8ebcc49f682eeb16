//! Fleet dispatch.
//!
//! Operations travel as [`Request`] messages. A [`VaultService`] answers
//! them either in-process ([`LocalService`]) or on another host through a
//! [`Transport`] ([`RemoteService`]). The [`Dispatcher`] fans one request
//! out to every target and collects one [`HostOutcome`] per host; a failed
//! host never stops the others and nothing is rolled back.
//!
//! Decryption is deliberately absent from [`Request`]: plaintext never
//! crosses hosts.

mod transport;

pub use transport::{SshTransport, Transport};

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::domain::{Credential, Host};
use crate::core::targets;
use crate::core::types::PrincipalInput;
use crate::core::vault::{
    AccessMode, AccessOutcome, ProtectOptions, ProtectOutcome, RemoveOutcome, ShowOutcome, Vault,
};
use crate::error::{Error, ErrorKind, Result, TransportError};

/// An operation that can run on any host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Request {
    Protect {
        identity: String,
        credential: Credential,
        options: ProtectOptions,
    },
    Remove {
        identity: String,
        #[serde(default)]
        prefix: Option<String>,
    },
    Show {
        #[serde(default)]
        identity: Option<String>,
        #[serde(default)]
        prefix: Option<String>,
    },
    Access {
        mode: AccessMode,
        identity: String,
        #[serde(default)]
        principals: Vec<PrincipalInput>,
        #[serde(default)]
        local: bool,
    },
}

impl Request {
    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Protect { .. } => "protect",
            Self::Remove { .. } => "remove",
            Self::Show { .. } => "show",
            Self::Access { mode, .. } => match mode {
                AccessMode::Grant => "grant",
                AccessMode::Revoke => "revoke",
                AccessMode::Reset => "reset-access",
            },
        }
    }
}

/// Successful result of a [`Request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum Response {
    Protected(ProtectOutcome),
    Removed(RemoveOutcome),
    Shown(ShowOutcome),
    Access(AccessOutcome),
}

/// Wire form of a remote answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "kebab-case")]
pub enum Reply {
    Ok(Response),
    Failed(RemoteFailure),
}

/// A failure categorised on the host where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<Result<Response>> for Reply {
    fn from(result: Result<Response>) -> Self {
        match result {
            Ok(response) => Self::Ok(response),
            Err(e) => Self::Failed(RemoteFailure {
                kind: e.kind(),
                message: e.to_string(),
            }),
        }
    }
}

/// Something that answers requests.
pub trait VaultService {
    fn call(&self, request: Request) -> Result<Response>;
}

/// Answers requests against a local vault.
pub struct LocalService<'a> {
    vault: &'a Vault,
}

impl<'a> LocalService<'a> {
    pub fn new(vault: &'a Vault) -> Self {
        Self { vault }
    }
}

impl VaultService for LocalService<'_> {
    fn call(&self, request: Request) -> Result<Response> {
        debug!(op = request.name(), host = %self.vault.host(), "executing locally");
        match request {
            Request::Protect {
                identity,
                credential,
                options,
            } => self
                .vault
                .protect(&identity, &credential, &options)
                .map(Response::Protected),
            Request::Remove { identity, prefix } => self
                .vault
                .remove(&identity, prefix.as_deref())
                .map(Response::Removed),
            Request::Show { identity, prefix } => self
                .vault
                .show(identity.as_deref(), prefix.as_deref())
                .map(Response::Shown),
            Request::Access {
                mode,
                identity,
                principals,
                local,
            } => self
                .vault
                .update_access(mode, &identity, &principals, local)
                .map(Response::Access),
        }
    }
}

/// Client stub for a vault on another host.
pub struct RemoteService<'a, T: Transport> {
    transport: &'a T,
    host: Host,
}

impl<'a, T: Transport> RemoteService<'a, T> {
    pub fn new(transport: &'a T, host: Host) -> Self {
        Self { transport, host }
    }
}

impl<T: Transport> VaultService for RemoteService<'_, T> {
    fn call(&self, request: Request) -> Result<Response> {
        debug!(op = request.name(), host = %self.host, "executing remotely");
        let payload = serde_json::to_vec(&request)?;
        let raw = self.transport.exchange(&self.host, &payload)?;

        let reply: Reply = serde_json::from_slice(&raw).map_err(|e| TransportError::Protocol {
            host: self.host.to_string(),
            reason: format!("unreadable reply: {}", e),
        })?;

        match reply {
            Reply::Ok(response) => Ok(response),
            Reply::Failed(failure) => Err(Error::Remote {
                host: self.host.to_string(),
                kind: failure.kind,
                message: failure.message,
            }),
        }
    }
}

/// Result for one target host.
#[derive(Debug)]
pub struct HostOutcome {
    pub host: Host,
    pub result: Result<Response>,
}

impl HostOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fans requests out to hosts.
pub struct Dispatcher<'a, T: Transport> {
    local: LocalService<'a>,
    local_host: Host,
    transport: T,
}

impl<'a, T: Transport> Dispatcher<'a, T> {
    pub fn new(vault: &'a Vault, transport: T) -> Self {
        Self {
            local_host: vault.host().clone(),
            local: LocalService::new(vault),
            transport,
        }
    }

    /// Run a request on every target.
    ///
    /// An empty target list means the local host. Targets equal to the local
    /// host run in-process; everything else goes through the transport.
    pub fn dispatch(&self, targets: &[Host], request: &Request) -> Vec<HostOutcome> {
        if targets::is_local_only(targets, &self.local_host) {
            let result = self.local.call(request.clone());
            if let Err(e) = &result {
                error!(host = %self.local_host, op = request.name(), "{}", e);
            }
            return vec![HostOutcome {
                host: self.local_host.clone(),
                result,
            }];
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for host in targets {
            let result = if host == &self.local_host {
                self.local.call(request.clone())
            } else {
                RemoteService::new(&self.transport, host.clone()).call(request.clone())
            };

            match &result {
                Ok(_) => info!(host = %host, op = request.name(), "completed"),
                Err(e) => error!(host = %host, op = request.name(), kind = %e.kind(), "{}", e),
            }
            outcomes.push(HostOutcome {
                host: host.clone(),
                result,
            });
        }
        outcomes
    }
}

/// Answer a single request read from `input`, writing the reply to `output`.
///
/// This is the remote end of [`SshTransport`]. Failures are written as
/// [`Reply::Failed`]; only I/O on the streams themselves is an error.
pub fn serve(vault: &Vault, mut input: impl Read, mut output: impl Write) -> Result<()> {
    let mut raw = Vec::new();
    input.read_to_end(&mut raw)?;

    let result = match serde_json::from_slice::<Request>(&raw) {
        Ok(request) => {
            info!(op = request.name(), "serving request");
            LocalService::new(vault).call(request)
        }
        Err(e) => Err(crate::error::ContentError::Malformed {
            path: "<request>".to_string(),
            reason: e.to_string(),
        }
        .into()),
    };

    write_reply(&mut output, Reply::from(result))
}

/// Answer with a failure when no vault could be opened to serve from.
pub fn refuse(error: Error, mut output: impl Write) -> Result<()> {
    error!(kind = %error.kind(), "refusing request: {}", error);
    write_reply(&mut output, Reply::from(Err(error)))
}

fn write_reply(output: &mut impl Write, reply: Reply) -> Result<()> {
    serde_json::to_writer(&mut *output, &reply)?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}
