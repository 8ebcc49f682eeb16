//! Command-line interface.

pub mod access;
pub mod completions;
pub mod fleet;
pub mod output;
pub mod protect;
pub mod remove;
pub mod serve;
pub mod show;
pub mod targets;
pub mod unprotect;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::config::Context;
use crate::core::constants::CONFIG_ENV;
use crate::core::domain::Host;
use crate::core::targets::TargetSpec;
use crate::error::Result;

/// cmsvault - host-local credential vault.
#[derive(Parser)]
#[command(
    name = "cmsvault",
    about = "Protect service credentials with per-host certificates",
    version
)]
pub struct Cli {
    /// Path to config.toml
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Hosts an operation should run on. Nothing given means this host.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target host (repeatable)
    #[arg(long = "host", value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Every node of a cluster (repeatable)
    #[arg(long = "cluster", value_name = "CLUSTER")]
    pub clusters: Vec<String>,

    /// Every node of the cluster this host belongs to
    #[arg(long)]
    pub local_cluster: bool,
}

impl TargetArgs {
    /// Validate host names into a target spec.
    pub fn to_spec(&self) -> Result<TargetSpec> {
        let hosts = self
            .hosts
            .iter()
            .map(|h| Host::new(h))
            .collect::<Result<Vec<_>>>()?;
        Ok(TargetSpec {
            hosts,
            clusters: self.clusters.clone(),
            local_cluster: self.local_cluster,
        })
    }
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Encrypt a credential for an identity
    Protect {
        /// Identity the credential belongs to (e.g., db-svc)
        identity: String,
        /// Account name stored with the secret
        #[arg(short, long)]
        username: Option<String>,
        /// Read the secret from stdin instead of prompting
        #[arg(long)]
        secret_stdin: bool,
        /// Always issue a new certificate
        #[arg(long)]
        reset: bool,
        /// Generations to keep after protecting
        #[arg(long, value_name = "N")]
        keep: Option<usize>,
        /// Keep every generation
        #[arg(long, conflicts_with = "keep")]
        no_prune: bool,
        /// Secret directory prefix
        #[arg(long)]
        prefix: Option<String>,
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Decrypt a credential on this host
    Unprotect {
        /// Identity to decrypt
        identity: String,
        /// Print the secret itself
        #[arg(long)]
        plain_text: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Secret directory prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Delete every certificate and file of an identity
    Remove {
        /// Identity to retire
        identity: String,
        /// Secret directory prefix
        #[arg(long)]
        prefix: Option<String>,
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Show certificates, files and access lists
    Show {
        /// Limit to one identity
        identity: Option<String>,
        /// Secret directory prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Give principals read access to an identity's private key
    Grant {
        /// Identity whose key to share
        identity: String,
        /// Account names or SIDs
        #[arg(required = true)]
        principals: Vec<String>,
        /// Qualify bare names against this machine
        #[arg(long)]
        local: bool,
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Take away principals' access to an identity's private key
    Revoke {
        /// Identity whose key to restrict
        identity: String,
        /// Account names or SIDs
        #[arg(required = true)]
        principals: Vec<String>,
        /// Qualify bare names against this machine
        #[arg(long)]
        local: bool,
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Restore the default access list on an identity's private key
    ResetAccess {
        /// Identity whose key to reset
        identity: String,
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Print the hosts a target selection resolves to
    Targets {
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Answer one request on stdin (remote end of fleet dispatch)
    #[command(hide = true)]
    Serve {
        /// Speak the request/reply protocol over stdin and stdout
        #[arg(long)]
        stdio: bool,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    if let Completions { shell } = cli.command {
        return completions::execute(shell);
    }

    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        Protect {
            identity,
            username,
            secret_stdin,
            reset,
            keep,
            no_prune,
            prefix,
            targets,
        } => protect::execute(
            &ctx,
            protect::ProtectArgs {
                identity,
                username,
                secret_stdin,
                reset,
                keep,
                no_prune,
                prefix,
            },
            &targets,
        ),
        Unprotect {
            identity,
            plain_text,
            json,
            prefix,
        } => unprotect::execute(&ctx, &identity, prefix.as_deref(), plain_text, json),
        Remove {
            identity,
            prefix,
            targets,
        } => remove::execute(&ctx, identity, prefix, &targets),
        Show {
            identity,
            prefix,
            json,
            targets,
        } => show::execute(&ctx, identity, prefix, json, &targets),
        Grant {
            identity,
            principals,
            local,
            targets,
        } => access::grant(&ctx, identity, principals, local, &targets),
        Revoke {
            identity,
            principals,
            local,
            targets,
        } => access::revoke(&ctx, identity, principals, local, &targets),
        ResetAccess { identity, targets } => access::reset(&ctx, identity, &targets),
        Targets { targets } => targets::execute(&ctx, &targets),
        Serve { stdio } => serve::execute(&ctx, stdio),
        Completions { .. } => Ok(()),
    }
}
