//! Binary loaders.
//!
//! A loader turns a candidate file into a [`LoadedBinary`]: the list of unit
//! exports it registers, plus whatever keeps its code resident.

pub mod builtin;
pub mod native;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use modhost_sdk::{RegisterFn, UnitExport, UnitRegistrar};

use crate::error::{Error, Result};

pub use builtin::StaticLoader;
pub use native::NativeLoader;

/// Loads one binary into the process.
pub trait BinaryLoader {
    /// Load `path` and collect its unit exports.
    ///
    /// Implementations load a given file at most once and return the cached
    /// result on later calls.
    fn load(&mut self, path: &Path) -> Result<LoadedBinary>;
}

/// A binary whose exports are available to the discovery engine.
#[derive(Debug, Clone)]
pub struct LoadedBinary {
    path: PathBuf,
    exports: Vec<UnitExport>,
    library: Option<Arc<Library>>,
}

impl LoadedBinary {
    pub fn new(path: impl Into<PathBuf>, exports: Vec<UnitExport>) -> Self {
        Self {
            path: path.into(),
            exports,
            library: None,
        }
    }

    pub(crate) fn with_library(mut self, library: Arc<Library>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exports(&self) -> &[UnitExport] {
        &self.exports
    }

    /// Handle keeping the library mapped, if the binary came from one.
    pub fn library(&self) -> Option<Arc<Library>> {
        self.library.clone()
    }
}

/// Run a registration function and collect its exports.
///
/// A registration that panicked inside a guarded unit binary fails the whole
/// binary.
pub(crate) fn collect_exports(path: &Path, register: RegisterFn) -> Result<Vec<UnitExport>> {
    let mut registrar = UnitRegistrar::new();
    register(&mut registrar);
    match registrar.failure() {
        Some(reason) => Err(Error::load(path, format!("Registration {reason}"))),
        None => Ok(registrar.into_exports()),
    }
}

/// Check if `path` has the given binary extension (case-insensitive).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Candidate binaries directly inside `dir`, sorted by file name.
///
/// Subdirectories are not searched; symlinks to files are included. An
/// unreadable entry is skipped. A missing directory is reported as
/// [`Error::DirectoryMissing`].
pub fn candidate_binaries(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryMissing(dir.to_path_buf()));
    }

    let mut binaries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        // Follows symlinks, unlike DirEntry::file_type.
        if has_extension(&path, extension) && path.is_file() {
            binaries.push(path);
        }
    }
    binaries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(
        dir = %dir.display(),
        count = binaries.len(),
        "Enumerated candidate binaries"
    );
    Ok(binaries)
}
