//! On-disk directory layout.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const PLUGINS_DIR: &str = "Plugins";
pub const CONFIGS_DIR: &str = "Configs";
pub const LOGS_DIR: &str = "Logs";
pub const PATCHES_DIR: &str = "Patches";

/// The base directory and its four fixed subdirectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub base: PathBuf,
    pub plugins: PathBuf,
    pub configs: PathBuf,
    pub logs: PathBuf,
    pub patches: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            plugins: base.join(PLUGINS_DIR),
            configs: base.join(CONFIGS_DIR),
            logs: base.join(LOGS_DIR),
            patches: base.join(PATCHES_DIR),
            base,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// All directories in creation order, base first.
    pub fn directories(&self) -> [&Path; 5] {
        [
            &self.base,
            &self.plugins,
            &self.configs,
            &self.logs,
            &self.patches,
        ]
    }

    /// Create any missing directory. Existing ones are left untouched.
    pub fn create_all(&self) -> Result<()> {
        for dir in self.directories() {
            std::fs::create_dir_all(dir).map_err(|source| Error::Bootstrap {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        tracing::debug!(base = %self.base.display(), "Directory layout ready");
        Ok(())
    }
}
