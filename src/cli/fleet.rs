//! Fleet dispatch and per-host reporting shared by the fleet commands.

use tracing::info;

use crate::cli::output;
use crate::cli::TargetArgs;
use crate::core::config::Context;
use crate::core::domain::Host;
use crate::core::fleet::{Dispatcher, HostOutcome, Request, Response, SshTransport};
use crate::core::targets;
use crate::core::vault::Vault;
use crate::error::{Error, Result};

/// Resolve targets and run a request on each of them.
pub fn dispatch(ctx: &Context, targets: &TargetArgs, request: Request) -> Result<Vec<HostOutcome>> {
    let spec = targets.to_spec()?;
    let hosts = targets::resolve(ctx.clusters(), &ctx.local_host, &spec);
    if !spec.is_empty() && hosts.is_empty() {
        output::warn(&format!(
            "no targets resolved, running on {}",
            output::host(&ctx.local_host)
        ));
    }

    let vault = Vault::open(ctx)?;
    let dispatcher = Dispatcher::new(&vault, SshTransport::new(&ctx.config.remote));
    info!(op = request.name(), hosts = hosts.len().max(1), "dispatching");
    Ok(dispatcher.dispatch(&hosts, &request))
}

/// Message for a failed host without repeating the host name.
pub fn describe(err: &Error) -> String {
    match err {
        Error::Remote { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// Print one line per host and fail if any host failed.
pub fn report<F>(outcomes: &[HostOutcome], render: F) -> Result<()>
where
    F: Fn(&Host, &Response) -> String,
{
    let mut failed = 0;
    for outcome in outcomes {
        match &outcome.result {
            Ok(response) => output::success(&format!(
                "{}: {}",
                output::host(&outcome.host),
                render(&outcome.host, response)
            )),
            Err(e) => {
                failed += 1;
                output::error(&format!(
                    "{}: [{}] {}",
                    output::host(&outcome.host),
                    e.kind(),
                    describe(e)
                ));
            }
        }
    }
    check(failed, outcomes.len())
}

/// Turn a failure count into the command result.
pub fn check(failed: usize, total: usize) -> Result<()> {
    if failed == 0 {
        Ok(())
    } else {
        Err(Error::Other(format!("{} of {} hosts failed", failed, total)))
    }
}
