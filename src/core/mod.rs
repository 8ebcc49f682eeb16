//! Core library components.
//!
//! Everything below the command line: domain types, key storage,
//! encryption, access control, target resolution and fleet dispatch.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod directory;
pub mod domain;
pub mod fleet;
pub mod store;
pub mod targets;
pub mod types;
pub mod validation;
pub mod vault;
