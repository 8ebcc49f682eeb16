//! Unprotect command.
//!
//! Decrypt a credential on this host. Never dispatched to other hosts, so
//! plaintext only ever appears on the machine it was requested on.

use serde::Serialize;
use tracing::info;

use crate::cli::output;
use crate::core::config::Context;
use crate::core::domain::Credential;
use crate::core::vault::Vault;
use crate::error::Result;

#[derive(Serialize)]
struct Unprotected<'a> {
    identity: &'a str,
    host: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
}

/// Decrypt and print a credential.
pub fn execute(
    ctx: &Context,
    identity: &str,
    prefix: Option<&str>,
    plain_text: bool,
    json: bool,
) -> Result<()> {
    info!("Unprotecting credential for {}", identity);

    let vault = Vault::open(ctx)?;
    let credential = vault.unprotect(identity, prefix)?;

    if json {
        let view = Unprotected {
            identity,
            host: vault.host().as_str(),
            username: credential.username(),
            secret: plain_text.then(|| credential.secret()),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if plain_text {
        println!("{}", credential.secret());
    } else {
        print_masked(identity, &credential);
    }

    Ok(())
}

fn print_masked(identity: &str, credential: &Credential) {
    output::header(identity);
    output::kv("username:", credential.username());
    output::kv("secret:  ", mask(credential.secret()));
    output::hint("use --plain-text to print the secret");
}

/// Mask a secret, at most eight characters wide.
fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count().min(8))
}
