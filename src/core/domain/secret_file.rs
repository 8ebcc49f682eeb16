//! Encrypted secret files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{Generation, Host};
use crate::core::constants::SECRET_FILE_EXTENSION;
use crate::error::Result;

/// One encrypted secret file, identified by its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFile {
    pub path: PathBuf,
    pub generation: Generation,
}

impl SecretFile {
    /// `<parent>/<prefix>_<host>`
    pub fn directory(parent: &Path, prefix: &str, host: &Host) -> PathBuf {
        parent.join(format!("{}_{}", prefix, host))
    }

    /// `<parent>/<prefix>_<host>/<host>-<identity>-<timestamp>.txt`
    pub fn path_for(parent: &Path, prefix: &str, generation: &Generation) -> PathBuf {
        Self::path_in(&Self::directory(parent, prefix, &generation.host), generation)
    }

    /// `<dir>/<host>-<identity>-<timestamp>.txt`
    pub fn path_in(dir: &Path, generation: &Generation) -> PathBuf {
        dir.join(format!("{}.{}", generation.name(), SECRET_FILE_EXTENSION))
    }

    /// Enumerate secret files for a host, optionally narrowed to one
    /// identity, sorted oldest first.
    ///
    /// A missing directory yields an empty list. Anything that is not a
    /// regular file, and files whose names do not parse as a generation of
    /// this host, are ignored.
    pub fn list(dir: &Path, host: &Host, identity: Option<&str>) -> Result<Vec<Self>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                trace!(path = %path.display(), "skipping non-file entry");
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(SECRET_FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(generation) = Generation::parse(stem, host) else {
                trace!(path = %path.display(), "skipping unrecognised file");
                continue;
            };
            if identity.is_some_and(|id| generation.identity != id) {
                continue;
            }
            files.push(Self { path, generation });
        }

        files.sort_by(|a, b| a.generation.cmp(&b.generation));
        Ok(files)
    }

    /// Certificate subject this file was encrypted for.
    pub fn subject(&self) -> String {
        self.generation.subject()
    }
}
