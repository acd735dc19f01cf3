//! Framework configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, then environment variables. The CLI applies its own flags on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default values
pub mod defaults {
    /// Name of the base directory created under the working directory.
    pub const BASE_DIR_NAME: &str = "modhost";

    /// Config file looked up inside `Configs/` when no path is given.
    pub const CONFIG_FILE_NAME: &str = "modhost.toml";

    /// Platform dynamic library extension (`so`, `dylib` or `dll`).
    pub const BINARY_EXTENSION: &str = std::env::consts::DLL_EXTENSION;
}

/// Environment variable names
pub mod env_vars {
    pub const BASE_DIR: &str = "MODHOST_BASE_DIR";
    pub const BINARY_EXTENSION: &str = "MODHOST_BINARY_EXTENSION";
    pub const SHOW_BANNER: &str = "MODHOST_SHOW_BANNER";
    /// Read by the CLI when it sets up logging.
    pub const LOG_JSON: &str = "MODHOST_LOG_JSON";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Directory holding `Plugins`, `Configs`, `Logs` and `Patches`.
    pub base_dir: PathBuf,

    /// File extension of loadable binaries, without the dot.
    pub binary_extension: String,

    /// Print the startup banner through the log sink.
    pub show_banner: bool,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            base_dir: cwd.join(defaults::BASE_DIR_NAME),
            binary_extension: defaults::BINARY_EXTENSION.to_string(),
            show_banner: true,
        }
    }
}

impl FrameworkConfig {
    /// Config rooted at `base_dir` with every other value defaulted.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` if given, otherwise defaults, then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::discovered()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// `Configs/modhost.toml` under the default base directory if present,
    /// otherwise defaults.
    fn discovered() -> Result<Self> {
        let mut located = Self::default();
        located.apply_env_overrides(|key| std::env::var(key).ok());
        let path = located.config_file_path();
        if path.is_file() {
            tracing::debug!(path = %path.display(), "Using discovered config file");
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Where the config file lives inside this config's layout.
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir
            .join(crate::layout::CONFIGS_DIR)
            .join(defaults::CONFIG_FILE_NAME)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Takes the lookup as a closure so callers and tests can supply their own
    /// source instead of mutating the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(env_vars::BASE_DIR).filter(|v| !v.is_empty()) {
            self.base_dir = PathBuf::from(dir);
        }
        if let Some(ext) = lookup(env_vars::BINARY_EXTENSION).filter(|v| !v.is_empty()) {
            self.binary_extension = ext;
        }
        if let Some(show) = lookup(env_vars::SHOW_BANNER).and_then(|v| v.parse().ok()) {
            self.show_banner = show;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.binary_extension.is_empty() {
            return Err(Error::Config("binary_extension must not be empty".to_string()));
        }
        if self.binary_extension.starts_with('.') {
            return Err(Error::Config(format!(
                "binary_extension '{}' must not start with a dot",
                self.binary_extension
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = FrameworkConfig::default();
        assert!(config.base_dir.ends_with(defaults::BASE_DIR_NAME));
        assert_eq!(config.binary_extension, std::env::consts::DLL_EXTENSION);
        assert!(config.show_banner);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FrameworkConfig::from_toml_str(
            r#"
            base_dir = "/srv/host"
            show_banner = false
            "#,
        )
        .unwrap();

        assert_eq!(config.base_dir, PathBuf::from("/srv/host"));
        assert!(!config.show_banner);
        assert_eq!(config.binary_extension, defaults::BINARY_EXTENSION);
    }

    #[test]
    fn test_invalid_extension_rejected() {
        let result = FrameworkConfig::from_toml_str(r#"binary_extension = ".dll""#);
        assert!(matches!(result, Err(Error::Config(_))));

        let result = FrameworkConfig::from_toml_str(r#"binary_extension = """#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = FrameworkConfig::from_toml_str(
            r#"
            base_dir = "/from/file"
            binary_extension = "so"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            (env_vars::BASE_DIR, "/from/env"),
            (env_vars::BINARY_EXTENSION, "dll"),
            (env_vars::SHOW_BANNER, "false"),
        ]
        .into_iter()
        .collect();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_dir, PathBuf::from("/from/env"));
        assert_eq!(config.binary_extension, "dll");
        assert!(!config.show_banner);
    }

    #[test]
    fn test_config_file_path() {
        let config = FrameworkConfig::with_base_dir("/srv/host");
        assert_eq!(
            config.config_file_path(),
            PathBuf::from("/srv/host/Configs/modhost.toml")
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = FrameworkConfig::with_base_dir("/opt/modhost");
        let text = config.to_toml().unwrap();
        assert_eq!(FrameworkConfig::from_toml_str(&text).unwrap(), config);
    }
}
