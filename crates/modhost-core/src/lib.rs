//! Host side of the modhost extension framework.
//!
//! Discovers plugins and patches in the `Plugins/` and `Patches/` directories
//! under the base directory, loads them, runs their initialization hooks and
//! keeps every successfully initialized unit in a [`UnitRegistry`].

pub mod banner;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod layout;
pub mod loader;
pub mod manager;
pub mod outcome;
pub mod registry;
pub mod sink;

pub use config::{defaults, env_vars, FrameworkConfig};
pub use discovery::discover;
pub use error::{Error, Result};
pub use events::{register_warhead_handler, Broadcaster, EventManager, WarheadDetonated};
pub use layout::Layout;
pub use loader::{candidate_binaries, BinaryLoader, LoadedBinary, NativeLoader, StaticLoader};
pub use manager::ExtensionManager;
pub use outcome::{Outcome, PassReport, Severity};
pub use registry::{LoadedUnit, UnitDescriptor, UnitHandle, UnitRegistry};
pub use sink::{ConsoleColor, ConsoleSink, LogLine, LogSink, MemorySink, TracingSink};

pub use modhost_sdk::{Capability, Patch, Plugin};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::config::FrameworkConfig;
    pub use crate::error::{Error, Result};
    pub use crate::manager::ExtensionManager;
    pub use crate::outcome::{Outcome, PassReport};
    pub use crate::registry::{UnitDescriptor, UnitHandle};
    pub use crate::sink::{ConsoleColor, LogSink, TracingSink};
    pub use modhost_sdk::{Capability, Patch, Plugin};
}
