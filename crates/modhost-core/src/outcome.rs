//! Structured outcomes of a discovery pass.
//!
//! Each outcome renders to exactly one log line with a fixed colour.

use std::path::{Path, PathBuf};

use modhost_sdk::Capability;
use serde::{Serialize, Serializer};

use crate::error::Error;
use crate::sink::ConsoleColor;

const PREFIX: &str = "[modhost]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Target directory is absent; the pass for it is skipped.
    DirectoryMissing {
        #[serde(serialize_with = "serialize_capability")]
        capability: Capability,
        dir: PathBuf,
    },
    /// Target directory holds no candidate binaries.
    NoCandidates {
        #[serde(serialize_with = "serialize_capability")]
        capability: Capability,
        dir: PathBuf,
    },
    /// A directory scan is starting.
    Searching {
        #[serde(serialize_with = "serialize_capability")]
        capability: Capability,
        dir: PathBuf,
        candidates: usize,
    },
    PluginEnabled {
        name: String,
        author: String,
        version: String,
        source: PathBuf,
    },
    PatchApplied {
        name: String,
        source: PathBuf,
    },
    LoadError {
        path: PathBuf,
        reason: String,
    },
    InitializationError {
        #[serde(serialize_with = "serialize_capability")]
        capability: Capability,
        type_name: String,
        path: PathBuf,
        reason: String,
    },
    BootstrapError {
        reason: String,
    },
    UnitUnloaded {
        #[serde(serialize_with = "serialize_capability")]
        capability: Capability,
        name: String,
    },
    TeardownError {
        name: String,
        reason: String,
    },
    FrameworkLoaded {
        plugins: usize,
        patches: usize,
    },
}

impl Outcome {
    pub(crate) fn load_error(path: &Path, err: &Error) -> Self {
        let reason = match err {
            Error::Load { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        Outcome::LoadError {
            path: path.to_path_buf(),
            reason,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Outcome::DirectoryMissing { .. }
            | Outcome::NoCandidates { .. }
            | Outcome::Searching { .. }
            | Outcome::UnitUnloaded { .. } => Severity::Info,
            Outcome::PluginEnabled { .. }
            | Outcome::PatchApplied { .. }
            | Outcome::FrameworkLoaded { .. } => Severity::Success,
            Outcome::TeardownError { .. } => Severity::Warning,
            Outcome::LoadError { .. }
            | Outcome::InitializationError { .. }
            | Outcome::BootstrapError { .. } => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn color(&self) -> ConsoleColor {
        match self {
            Outcome::DirectoryMissing { .. }
            | Outcome::NoCandidates { .. }
            | Outcome::Searching { .. } => ConsoleColor::Yellow,
            Outcome::PluginEnabled { .. } => ConsoleColor::Cyan,
            Outcome::PatchApplied { .. } | Outcome::UnitUnloaded { .. } => ConsoleColor::Blue,
            Outcome::FrameworkLoaded { .. } => ConsoleColor::Green,
            Outcome::InitializationError {
                capability: Capability::Patch,
                ..
            }
            | Outcome::TeardownError { .. } => ConsoleColor::DarkRed,
            Outcome::LoadError { .. }
            | Outcome::InitializationError { .. }
            | Outcome::BootstrapError { .. } => ConsoleColor::Red,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::DirectoryMissing { capability, dir } => format!(
                "{PREFIX} {} folder not found: {}",
                folder_label(*capability),
                dir.display()
            ),
            Outcome::NoCandidates { capability, dir } => {
                format!(
                    "{PREFIX} No {} found in {}",
                    plural_label(*capability),
                    dir.display()
                )
            }
            Outcome::Searching {
                capability,
                dir,
                candidates,
            } => format!(
                "{PREFIX} Searching for {} in {} ({} candidate binaries)",
                plural_label(*capability),
                dir.display(),
                candidates
            ),
            Outcome::PluginEnabled { name, version, .. } => {
                format!("{PREFIX} Loaded: {name} v{version}")
            }
            Outcome::PatchApplied { name, .. } => {
                format!("{PREFIX} The patch has been loaded: {name}")
            }
            Outcome::LoadError { path, reason } => {
                format!("{PREFIX} Error loading {}: {reason}", file_label(path))
            }
            Outcome::InitializationError {
                capability,
                type_name,
                path,
                reason,
            } => format!(
                "{PREFIX} Error initializing {capability} {type_name} from {}: {reason}",
                file_label(path)
            ),
            Outcome::BootstrapError { reason } => {
                format!("{PREFIX} Configuration error: {reason}")
            }
            Outcome::UnitUnloaded { capability, name } => {
                format!("{PREFIX} Unloaded {capability}: {name}")
            }
            Outcome::TeardownError { name, reason } => {
                format!("{PREFIX} Error unloading {name}: {reason}")
            }
            Outcome::FrameworkLoaded { plugins, patches } => format!(
                "{PREFIX} Framework loaded successfully! ({plugins} plugins, {patches} patches)"
            ),
        }
    }
}

fn folder_label(capability: Capability) -> &'static str {
    match capability {
        Capability::Plugin => "Plugins",
        Capability::Patch => "Patches",
    }
}

fn plural_label(capability: Capability) -> &'static str {
    match capability {
        Capability::Plugin => "plugins",
        Capability::Patch => "patches",
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn serialize_capability<S: Serializer>(
    capability: &Capability,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(capability.as_str())
}

/// Outcomes recorded during one or more discovery passes, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub outcomes: Vec<Outcome>,
}

impl PassReport {
    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, other: PassReport) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn load_errors(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::LoadError { .. }))
            .count()
    }

    pub fn initialization_errors(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::InitializationError { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
