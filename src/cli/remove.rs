//! Remove command.
//!
//! Retire an identity: delete every certificate and secret file it has on
//! the targeted hosts.

use tracing::info;

use crate::cli::fleet;
use crate::cli::output;
use crate::cli::TargetArgs;
use crate::core::config::Context;
use crate::core::fleet::{Request, Response};
use crate::error::Result;

/// Remove an identity.
pub fn execute(
    ctx: &Context,
    identity: String,
    prefix: Option<String>,
    targets: &TargetArgs,
) -> Result<()> {
    info!("Removing {}", identity);

    let outcomes = fleet::dispatch(ctx, targets, Request::Remove { identity, prefix })?;
    fleet::report(&outcomes, |_, response| match response {
        Response::Removed(outcome) => {
            for failure in &outcome.retention.failures {
                output::warn(&failure.to_string());
            }
            format!(
                "removed {} ({} certificate(s), {} file(s))",
                outcome.identity,
                outcome.retention.certificates.len(),
                outcome.retention.files.len()
            )
        }
        _ => "done".to_string(),
    })
}
