//! Access commands.
//!
//! Grant, revoke and reset read access to an identity's private key.

use tracing::info;

use crate::cli::fleet;
use crate::cli::TargetArgs;
use crate::core::config::Context;
use crate::core::fleet::{Request, Response};
use crate::core::types::PrincipalInput;
use crate::core::vault::{AccessMode, AccessOutcome};
use crate::error::Result;

/// Grant principals read access.
pub fn grant(
    ctx: &Context,
    identity: String,
    principals: Vec<PrincipalInput>,
    local: bool,
    targets: &TargetArgs,
) -> Result<()> {
    run(ctx, AccessMode::Grant, identity, principals, local, targets)
}

/// Revoke principals' access.
pub fn revoke(
    ctx: &Context,
    identity: String,
    principals: Vec<PrincipalInput>,
    local: bool,
    targets: &TargetArgs,
) -> Result<()> {
    run(ctx, AccessMode::Revoke, identity, principals, local, targets)
}

/// Restore the default access list.
pub fn reset(ctx: &Context, identity: String, targets: &TargetArgs) -> Result<()> {
    run(ctx, AccessMode::Reset, identity, Vec::new(), false, targets)
}

fn run(
    ctx: &Context,
    mode: AccessMode,
    identity: String,
    principals: Vec<PrincipalInput>,
    local: bool,
    targets: &TargetArgs,
) -> Result<()> {
    info!("Updating access ({}) for {}", mode, identity);

    let request = Request::Access {
        mode,
        identity,
        principals,
        local,
    };
    let outcomes = fleet::dispatch(ctx, targets, request)?;
    fleet::report(&outcomes, |_, response| match response {
        Response::Access(outcome) => summarize(outcome),
        _ => "done".to_string(),
    })
}

fn summarize(outcome: &AccessOutcome) -> String {
    if !outcome.changed() {
        return format!("{} unchanged on {}", outcome.mode, outcome.certificate);
    }
    let mut parts = Vec::new();
    if !outcome.added.is_empty() {
        parts.push(format!("+{}", join(&outcome.added)));
    }
    if !outcome.removed.is_empty() {
        parts.push(format!("-{}", join(&outcome.removed)));
    }
    format!("{} on {}: {}", outcome.mode, outcome.certificate, parts.join(" "))
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}
