//! Error types for the host side of the framework.

use std::path::PathBuf;

use modhost_sdk::Capability;

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while bootstrapping, loading or managing units.
///
/// The extension manager converts every one of these into an
/// [`Outcome`](crate::outcome::Outcome) at the smallest enclosing scope; none
/// of them escapes `ExtensionManager::initialize`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Target directory does not exist. Informational.
    #[error("Directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),

    /// A binary could not be loaded.
    #[error("Failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// A discovered unit could not be constructed or its initialization hook failed.
    #[error("Failed to initialize {capability} {type_name}: {reason}")]
    Initialization {
        capability: Capability,
        type_name: String,
        reason: String,
    },

    /// Directory layout could not be created.
    #[error("Failed to create {}: {source}", path.display())]
    Bootstrap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A unit's teardown hook failed. The unit is unloaded regardless.
    #[error("Teardown of {name} failed: {reason}")]
    Teardown { name: String, reason: String },

    /// Handle does not refer to a registered unit.
    #[error("Unknown unit handle: {0}")]
    UnknownHandle(usize),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is informational rather than a failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, Error::DirectoryMissing(_))
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
