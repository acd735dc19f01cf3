//! Statically linked units.
//!
//! Hosts that link their units at compile time register each unit set's
//! registration function under the binary file name it stands for. The
//! directory layout and discovery rules stay the same: a file named
//! `fastdoors.so` in `Plugins/` activates the set registered as `fastdoors.so`.

use std::collections::HashMap;
use std::path::Path;

use modhost_sdk::RegisterFn;

use super::{collect_exports, BinaryLoader, LoadedBinary};
use crate::error::{Error, Result};

#[derive(Default)]
pub struct StaticLoader {
    sets: HashMap<String, RegisterFn>,
    loaded: HashMap<String, LoadedBinary>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the unit set backing `file_name`.
    pub fn with_binary(mut self, file_name: impl Into<String>, register: RegisterFn) -> Self {
        self.sets.insert(file_name.into(), register);
        self
    }

    /// Number of sets loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl BinaryLoader for StaticLoader {
    fn load(&mut self, path: &Path) -> Result<LoadedBinary> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::load(path, "Path has no file name"))?;

        if let Some(binary) = self.loaded.get(&file_name) {
            return Ok(binary.clone());
        }

        let register = self
            .sets
            .get(&file_name)
            .ok_or_else(|| Error::load(path, "No statically linked unit set for this binary"))?;

        let binary = LoadedBinary::new(path, collect_exports(path, *register)?);
        self.loaded.insert(file_name, binary.clone());
        Ok(binary)
    }
}
