//! Targets command.
//!
//! Preview which hosts a target selection resolves to, without running
//! anything on them.

use crate::cli::output;
use crate::cli::TargetArgs;
use crate::core::config::Context;
use crate::core::targets;
use crate::error::Result;

/// Print resolved targets.
pub fn execute(ctx: &Context, args: &TargetArgs) -> Result<()> {
    let spec = args.to_spec()?;
    let hosts = targets::resolve(ctx.clusters(), &ctx.local_host, &spec);

    if hosts.is_empty() {
        output::dimmed(&format!("{} (local)", ctx.local_host));
        return Ok(());
    }

    for host in &hosts {
        if host == &ctx.local_host {
            println!("{} (local)", host);
        } else {
            println!("{}", host);
        }
    }
    Ok(())
}
