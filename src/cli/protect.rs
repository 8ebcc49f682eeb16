//! Protect command.
//!
//! Encrypt a credential for an identity on one or more hosts. The secret is
//! read from stdin when piped and otherwise prompted for with hidden input.

use std::io::{self, BufRead};

use dialoguer::{Input, Password};
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::fleet;
use crate::cli::output;
use crate::cli::TargetArgs;
use crate::core::config::Context;
use crate::core::constants::DEFAULT_KEEP;
use crate::core::domain::Credential;
use crate::core::fleet::{Request, Response};
use crate::core::vault::ProtectOptions;
use crate::error::{Result, ValidationError};

/// Arguments of the protect command.
#[derive(Debug, Clone)]
pub struct ProtectArgs {
    pub identity: String,
    pub username: Option<String>,
    pub secret_stdin: bool,
    pub reset: bool,
    pub keep: Option<usize>,
    pub no_prune: bool,
    pub prefix: Option<String>,
}

impl ProtectArgs {
    fn options(&self) -> ProtectOptions {
        let keep = if self.no_prune {
            None
        } else {
            Some(self.keep.unwrap_or(DEFAULT_KEEP))
        };
        ProtectOptions {
            reset: self.reset,
            keep,
            prefix: self.prefix.clone(),
        }
    }
}

/// Protect a credential.
pub fn execute(ctx: &Context, args: ProtectArgs, targets: &TargetArgs) -> Result<()> {
    info!("Protecting credential for {}", args.identity);

    let interactive = atty::is(atty::Stream::Stdin);
    let username = match &args.username {
        Some(u) => u.clone(),
        None if interactive && !args.secret_stdin => Input::<String>::new()
            .with_prompt(format!("Username for {}", args.identity))
            .interact_text()?,
        None => return Err(ValidationError::EmptyUsername.into()),
    };

    let secret = if args.secret_stdin || !interactive {
        read_secret(io::stdin().lock())?
    } else {
        Zeroizing::new(
            Password::new()
                .with_prompt(format!("Secret for {}", username))
                .interact()?,
        )
    };

    let credential = Credential::new(username, secret.as_str())?;
    let request = Request::Protect {
        identity: args.identity.clone(),
        credential,
        options: args.options(),
    };

    let outcomes = fleet::dispatch(ctx, targets, request)?;
    fleet::report(&outcomes, |_, response| match response {
        Response::Protected(outcome) => {
            let verb = if outcome.issued { "issued" } else { "reused" };
            let mut line = format!(
                "protected {} ({} {})",
                args.identity, verb, outcome.certificate
            );
            if let Some(retention) = &outcome.retention {
                if retention.removed_anything() {
                    line.push_str(&format!(
                        ", pruned {} certificate(s) and {} file(s)",
                        retention.certificates.len(),
                        retention.files.len()
                    ));
                }
                for failure in &retention.failures {
                    output::warn(&failure.to_string());
                }
            }
            line
        }
        _ => "done".to_string(),
    })
}

/// Read one line from a reader, without the trailing newline.
fn read_secret(mut reader: impl BufRead) -> Result<Zeroizing<String>> {
    let mut input = Zeroizing::new(String::new());
    reader.read_line(&mut input)?;
    let trimmed = input.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Err(ValidationError::EmptySecret.into());
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}
