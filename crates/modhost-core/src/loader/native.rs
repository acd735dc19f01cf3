//! Native binary loader for .so/.dylib/.dll files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use modhost_sdk::{RegisterFn, ABI_VERSION_SYMBOL, REGISTER_SYMBOL, UNIT_ABI_VERSION};

use super::{collect_exports, BinaryLoader, LoadedBinary};
use crate::error::{Error, Result};

type AbiVersionFn = extern "C" fn() -> u32;

/// Loader for dynamic libraries exporting the modhost registration symbols.
///
/// Libraries stay mapped while the loader or any registered unit holds a
/// handle to them.
#[derive(Default)]
pub struct NativeLoader {
    /// Loaded binaries by canonical path
    loaded: HashMap<PathBuf, LoadedBinary>,
}

impl NativeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct libraries opened so far.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    fn open(&self, path: &Path, canonical: &Path) -> Result<LoadedBinary> {
        // SAFETY: loading a library runs its initialisers. Binaries in the
        // target directories are trusted to be built against this SDK.
        let library = unsafe { Library::new(canonical) }
            .map_err(|e| Error::load(path, format!("Failed to load library: {e}")))?;

        let exports = {
            // SAFETY: the symbol type matches the one `export_units!` generates.
            let abi_version: Symbol<AbiVersionFn> = unsafe { library.get(ABI_VERSION_SYMBOL) }
                .map_err(|e| Error::load(path, format!("Missing ABI version symbol: {e}")))?;

            let found = abi_version();
            if found != UNIT_ABI_VERSION {
                return Err(Error::load(
                    path,
                    format!("ABI version mismatch: expected {UNIT_ABI_VERSION}, found {found}"),
                ));
            }

            // SAFETY: as above; the library outlives this call.
            let register: Symbol<RegisterFn> = unsafe { library.get(REGISTER_SYMBOL) }
                .map_err(|e| Error::load(path, format!("Missing registration symbol: {e}")))?;

            // Panics are caught inside the binary; see `modhost_sdk::guard`.
            collect_exports(path, *register)?
        };

        tracing::debug!(
            path = %path.display(),
            exports = exports.len(),
            "Loaded native binary"
        );

        Ok(LoadedBinary::new(path, exports).with_library(Arc::new(library)))
    }
}

impl BinaryLoader for NativeLoader {
    fn load(&mut self, path: &Path) -> Result<LoadedBinary> {
        if !path.is_file() {
            return Err(Error::load(path, "File not found"));
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| Error::load(path, format!("Cannot canonicalize path: {e}")))?;

        if let Some(binary) = self.loaded.get(&canonical) {
            return Ok(binary.clone());
        }

        let binary = self.open(path, &canonical)?;
        self.loaded.insert(canonical, binary.clone());
        Ok(binary)
    }
}
