//! Show command.
//!
//! List certificates, secret files and key access for identities on the
//! targeted hosts.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::cli::fleet;
use crate::cli::output;
use crate::cli::TargetArgs;
use crate::core::config::Context;
use crate::core::domain::{Host, Rights};
use crate::core::fleet::{HostOutcome, Request, Response};
use crate::core::vault::{IdentityStatus, ShowOutcome};
use crate::error::Result;

/// JSON view of one host's answer.
#[derive(Serialize)]
#[serde(untagged)]
enum HostView<'a> {
    Shown(&'a ShowOutcome),
    Failed { kind: String, error: String },
}

/// Show stored state.
pub fn execute(
    ctx: &Context,
    identity: Option<String>,
    prefix: Option<String>,
    json: bool,
    targets: &TargetArgs,
) -> Result<()> {
    info!("Showing {}", identity.as_deref().unwrap_or("all identities"));

    let outcomes = fleet::dispatch(ctx, targets, Request::Show { identity, prefix })?;
    if json {
        return print_json(&outcomes);
    }

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(Response::Shown(shown)) => print_host(&outcome.host, shown),
            Ok(_) => {}
            Err(e) => {
                failed += 1;
                output::error(&format!(
                    "{}: [{}] {}",
                    output::host(&outcome.host),
                    e.kind(),
                    fleet::describe(e)
                ));
            }
        }
    }
    fleet::check(failed, outcomes.len())
}

fn print_json(outcomes: &[HostOutcome]) -> Result<()> {
    let mut view = BTreeMap::new();
    let mut failed = 0;
    for outcome in outcomes {
        let entry = match &outcome.result {
            Ok(Response::Shown(shown)) => HostView::Shown(shown),
            Ok(_) => continue,
            Err(e) => {
                failed += 1;
                HostView::Failed {
                    kind: e.kind().to_string(),
                    error: fleet::describe(e),
                }
            }
        };
        view.insert(outcome.host.as_str(), entry);
    }
    println!("{}", serde_json::to_string_pretty(&view)?);
    fleet::check(failed, outcomes.len())
}

fn print_host(host: &Host, shown: &ShowOutcome) {
    output::section(&host.to_string());
    if shown.identities.is_empty() {
        output::dimmed("  nothing protected");
        return;
    }
    for status in &shown.identities {
        print_identity(status);
    }
}

fn print_identity(status: &IdentityStatus) {
    println!();
    output::header(&format!("  {}", status.identity));

    if status.certificates.is_empty() {
        output::dimmed("    no certificates");
    }
    for cert in &status.certificates {
        output::list_item(&cert.subject);
        output::kv("    created:   ", cert.created.to_rfc3339());
        output::kv("    expires:   ", cert.not_after.to_rfc3339());
        output::kv("    thumbprint:", &cert.thumbprint);
    }

    if status.files.is_empty() {
        output::dimmed("    no secret files");
    }
    for file in &status.files {
        output::list_item(&output::path(file.display()));
    }

    if !status.access.is_empty() {
        output::dimmed("    access:");
        for ace in &status.access {
            let rights = match ace.rights {
                Rights::Read => "read",
                Rights::FullControl => "full-control",
            };
            output::list_item(&format!("{} {}", ace.sid, rights));
        }
    }
}
