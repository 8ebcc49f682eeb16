//! Domain types.

pub mod acl;
mod certificate;
mod credential;
mod host;
pub mod principal;
mod secret_file;

pub use acl::{Ace, Acl, Effect, Rights};
pub use certificate::{format_timestamp, parse_timestamp, Certificate, Generation, KeyUsage};
pub use credential::Credential;
pub use host::Host;
pub use principal::{PrincipalName, Sid, Token, WellKnown};
pub use secret_file::SecretFile;
