//! cmsvault - host-local credential vault.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cmsvault::cli::output;
use cmsvault::cli::{execute, Cli};
use cmsvault::core::constants::LOG_ENV;
use cmsvault::error::{AccessError, ConfigError, Error, ErrorKind, NotFoundError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("cmsvault=debug")
        } else {
            EnvFilter::new("cmsvault=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

/// Suggested next step for an error, if there is an obvious one.
fn hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::Access(AccessError::Denied { .. }) => {
            Some("ask the key owner to run: cmsvault grant <identity> <your account>")
        }
        Error::Access(AccessError::NoDefaultDomain(_)) => {
            Some("pass --local, qualify the name as DOMAIN\\name, or set directory.default_domain")
        }
        Error::NotFound(NotFoundError::SecretFile { .. }) => {
            Some("run: cmsvault protect <identity>")
        }
        Error::Config(ConfigError::NoHostName) => Some("set vault.host in config.toml"),
        _ if err.kind() == ErrorKind::Connection => {
            Some("check ssh access and remote.command in config.toml")
        }
        _ => None,
    }
}
