//! Serve command.
//!
//! The remote end of fleet dispatch: reads one request from stdin, runs it
//! against this host's vault and writes the reply to stdout.

use std::io;

use crate::core::config::Context;
use crate::core::fleet;
use crate::core::vault::Vault;
use crate::error::{Error, Result};

/// Answer a single request.
pub fn execute(ctx: &Context, stdio: bool) -> Result<()> {
    if !stdio {
        return Err(Error::Other("serve only speaks over --stdio".to_string()));
    }
    match Vault::open(ctx) {
        Ok(vault) => fleet::serve(&vault, io::stdin().lock(), io::stdout().lock()),
        Err(e) => fleet::refuse(e, io::stdout().lock()),
    }
}
